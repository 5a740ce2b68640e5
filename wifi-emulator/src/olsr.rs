//! Rendering of `olsrd` configuration files for ad-hoc nodes
//!
//! Only the configuration text is produced here. Running the daemon is up to the caller.

use std::fmt;
use std::net::Ipv4Addr;

#[derive(Clone, Debug, PartialEq)]
pub struct OlsrConfig {
    pub debug_level: u8,
    pub ip_version: u8,
    pub allow_no_interfaces: bool,
    pub tos_value: u8,
    pub rt_proto: u8,
    pub rt_table: u8,
    pub rt_table_default: u8,
    pub willingness: u8,
    pub ipc: IpcConnect,
    pub plugins: Vec<OlsrPlugin>,
    pub timings: InterfaceTimings,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IpcConnect {
    pub max_connections: u32,
    pub host: Ipv4Addr,
    pub net: (Ipv4Addr, Ipv4Addr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OlsrPlugin {
    pub library: String,
    pub params: Vec<(String, String)>,
}

impl OlsrPlugin {
    fn new(library: &str) -> Self {
        Self {
            library: library.to_string(),
            params: Vec::new(),
        }
    }

    fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }
}

/// Message intervals and validity times, in seconds
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceTimings {
    pub hello_interval: f64,
    pub hello_validity: f64,
    pub tc_interval: f64,
    pub tc_validity: f64,
    pub mid_interval: f64,
    pub mid_validity: f64,
}

impl Default for OlsrConfig {
    fn default() -> Self {
        Self {
            debug_level: 2,
            ip_version: 4,
            allow_no_interfaces: true,
            tos_value: 16,
            rt_proto: 0,
            rt_table: 254,
            rt_table_default: 0,
            willingness: 7,
            ipc: IpcConnect {
                max_connections: 2,
                host: Ipv4Addr::LOCALHOST,
                net: (Ipv4Addr::UNSPECIFIED, Ipv4Addr::UNSPECIFIED),
            },
            plugins: vec![
                OlsrPlugin::new("olsrd_arprefresh.so.0.1"),
                OlsrPlugin::new("olsrd_dyn_gw.so.0.5"),
                OlsrPlugin::new("olsrd_txtinfo.so.1.1")
                    .with_param("port", "2006")
                    .with_param("Accept", "127.0.0.1"),
            ],
            timings: InterfaceTimings {
                hello_interval: 2.0,
                hello_validity: 20.0,
                tc_interval: 5.0,
                tc_validity: 30.0,
                mid_interval: 5.0,
                mid_validity: 30.0,
            },
        }
    }
}

impl OlsrConfig {
    /// The wireless interface `olsrd` should run on for the given node
    pub fn interface_name(node_id: &str) -> String {
        format!("{node_id}-wlan0")
    }

    pub fn config_file_name(node_id: &str) -> String {
        format!("olsrd_{node_id}.conf")
    }

    pub fn render(&self, interface: &str) -> String {
        ConfigFile {
            config: self,
            interface,
        }
        .to_string()
    }
}

struct ConfigFile<'a> {
    config: &'a OlsrConfig,
    interface: &'a str,
}

impl fmt::Display for ConfigFile<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ConfigFile {
            config: this,
            interface,
        } = *self;
        let yes_no = |b: bool| if b { "yes" } else { "no" };

        writeln!(out, "# OLSR configuration for {interface}")?;
        writeln!(out, "DebugLevel {}", this.debug_level)?;
        writeln!(out, "IpVersion {}", this.ip_version)?;
        writeln!(out, "AllowNoInt {}", yes_no(this.allow_no_interfaces))?;
        writeln!(out, "TosValue {}", this.tos_value)?;
        writeln!(out, "RtProto {}", this.rt_proto)?;
        writeln!(out, "RtTable {}", this.rt_table)?;
        writeln!(out, "RtTableDefault {}", this.rt_table_default)?;
        writeln!(out, "Willingness {}", this.willingness)?;

        writeln!(out, "IpcConnect")?;
        writeln!(out, "{{")?;
        writeln!(out, "    MaxConnections {}", this.ipc.max_connections)?;
        writeln!(out, "    Host {}", this.ipc.host)?;
        writeln!(out, "    Net {} {}", this.ipc.net.0, this.ipc.net.1)?;
        writeln!(out, "}}")?;

        for plugin in &this.plugins {
            writeln!(out, "LoadPlugin \"{}\"", plugin.library)?;
            if !plugin.params.is_empty() {
                writeln!(out, "{{")?;
                for (name, value) in &plugin.params {
                    writeln!(out, "    PlParam \"{name}\" \"{value}\"")?;
                }
                writeln!(out, "}}")?;
            }
        }

        let t = &this.timings;
        writeln!(out)?;
        writeln!(out, "Interface \"{interface}\"")?;
        writeln!(out, "{{")?;
        writeln!(out, "    HelloInterval {:.1}", t.hello_interval)?;
        writeln!(out, "    HelloValidityTime {:.1}", t.hello_validity)?;
        writeln!(out, "    TcInterval {:.1}", t.tc_interval)?;
        writeln!(out, "    TcValidityTime {:.1}", t.tc_validity)?;
        writeln!(out, "    MidInterval {:.1}", t.mid_interval)?;
        writeln!(out, "    MidValidityTime {:.1}", t.mid_validity)?;
        writeln!(out, "}}")?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_file_and_interface_names() {
        assert_eq!(OlsrConfig::interface_name("adhoc1"), "adhoc1-wlan0");
        assert_eq!(OlsrConfig::config_file_name("adhoc1"), "olsrd_adhoc1.conf");
    }

    #[test]
    fn test_render_default_config() {
        let rendered = OlsrConfig::default().render("adhoc2-wlan0");
        let expected = r#"# OLSR configuration for adhoc2-wlan0
DebugLevel 2
IpVersion 4
AllowNoInt yes
TosValue 16
RtProto 0
RtTable 254
RtTableDefault 0
Willingness 7
IpcConnect
{
    MaxConnections 2
    Host 127.0.0.1
    Net 0.0.0.0 0.0.0.0
}
LoadPlugin "olsrd_arprefresh.so.0.1"
LoadPlugin "olsrd_dyn_gw.so.0.5"
LoadPlugin "olsrd_txtinfo.so.1.1"
{
    PlParam "port" "2006"
    PlParam "Accept" "127.0.0.1"
}

Interface "adhoc2-wlan0"
{
    HelloInterval 2.0
    HelloValidityTime 20.0
    TcInterval 5.0
    TcValidityTime 30.0
    MidInterval 5.0
    MidValidityTime 30.0
}
"#;

        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_custom_timings() {
        let mut config = OlsrConfig::default();
        config.willingness = 3;
        config.timings.hello_interval = 0.5;
        config.plugins.clear();

        let rendered = config.render("adhoc1-wlan0");
        assert!(rendered.contains("Willingness 3\n"));
        assert!(rendered.contains("    HelloInterval 0.5\n"));
        assert!(!rendered.contains("LoadPlugin"));
    }
}
