pub mod async_rt;
pub mod iperf;
pub mod mobility;
pub mod network;
pub mod olsr;
pub mod trace;
