pub mod mobility_step;
pub mod stepper;
pub mod tracer;
pub mod verifier;
