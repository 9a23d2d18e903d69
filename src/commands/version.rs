//! Version command: the binary version and the environment actions run in

use std::fmt::Write as _;

use crate::config::{Config, Driver};
use crate::error::Result;

pub fn run(config: &Config) -> Result<()> {
    print!("{}", report(config));
    Ok(())
}

fn report(config: &Config) -> String {
    let settings = &config.settings;
    let mut out = format!("stevedore {}\n\n", env!("CARGO_PKG_VERSION"));

    let _ = writeln!(out, "Home:        {}", config.home.display());
    let _ = writeln!(out, "Driver:      {}", settings.driver);
    if settings.driver == Driver::Docker {
        let _ = writeln!(out, "Container:   {}", settings.docker.command);
        let kubeconfig = if settings.docker.mount_kubeconfig {
            config.kubeconfig.display().to_string()
        } else {
            "not mounted".to_string()
        };
        let _ = writeln!(out, "Kubeconfig:  {kubeconfig}");
    }
    let _ = writeln!(out, "Cache:       {}", config.cache_dir().display());
    let _ = writeln!(out, "Claims:      {}", config.claims_dir().display());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_report_for_docker_driver() {
        let mut config = Config::new("/srv/stevedore", BTreeMap::new());
        config.settings.docker.command = "podman".to_string();

        let report = report(&config);
        assert!(report.starts_with(&format!("stevedore {}", env!("CARGO_PKG_VERSION"))));
        assert!(report.contains("Driver:      docker"));
        assert!(report.contains("Container:   podman"));
        assert!(report.contains("Kubeconfig:  not mounted"));
    }

    #[test]
    fn test_report_for_debug_driver_omits_container() {
        let mut config = Config::new("/srv/stevedore", BTreeMap::new());
        config.settings.driver = Driver::Debug;

        let report = report(&config);
        assert!(report.contains("Driver:      debug"));
        assert!(!report.contains("Container:"));
    }
}
