use clap::{Parser, ValueEnum};
use hmc_dashboard::config::DashboardConfig;
use hmc_dashboard::controller::Page;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hmc-dashboard",
    version,
    about = "Chart per-user health records served by the HMC dashboard server"
)]
pub(crate) struct Args {
    /// Config file (default: <config dir>/hmc-dashboard/config.toml if present)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Dashboard server base url, e.g. http://127.0.0.1:5000
    #[arg(long)]
    pub(crate) server: Option<String>,
    /// User metadata CSV used to fill the user selector
    #[arg(long)]
    pub(crate) metadata: Option<PathBuf>,
    /// Initially selected user
    #[arg(long)]
    pub(crate) user: Option<String>,
    /// Initially selected view
    #[arg(long)]
    pub(crate) view: Option<String>,
    /// Fetch once, print the status line and exit
    #[arg(long)]
    pub(crate) headless: bool,
    /// With --headless: write the fetched chart to this PNG file
    #[arg(long, requires = "headless")]
    pub(crate) export: Option<PathBuf>,
    /// With --headless: which chart to fetch (default: overview)
    #[arg(long, value_enum, requires = "headless")]
    pub(crate) page: Option<PageArg>,
    /// With --headless --page compare: the second user
    #[arg(long, requires = "headless")]
    pub(crate) other_user: Option<String>,
}

/// Pages that render a chart.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PageArg {
    Overview,
    Compare,
    SleepBpm,
    SleepSpo2,
    BpmStress,
}

impl From<PageArg> for Page {
    fn from(arg: PageArg) -> Self {
        match arg {
            PageArg::Overview => Page::Overview,
            PageArg::Compare => Page::CompareUsers,
            PageArg::SleepBpm => Page::SleepBpm,
            PageArg::SleepSpo2 => Page::SleepSpo2,
            PageArg::BpmStress => Page::BpmStress,
        }
    }
}

impl Args {
    /// Command-line values win over the config file.
    pub(crate) fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(metadata) = &self.metadata {
            config.metadata_file = metadata.clone();
        }
        if let Some(user) = &self.user {
            config.default_user = user.clone();
        }
        if let Some(view) = &self.view {
            config.default_view = view.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let args = Args::parse_from([
            "hmc-dashboard",
            "--server",
            "http://10.0.0.2:8080",
            "--user",
            "alice",
            "--view",
            "stress",
        ]);
        let mut config = DashboardConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.server_url, "http://10.0.0.2:8080");
        assert_eq!(config.default_user, "alice");
        assert_eq!(config.default_view, "stress");
        assert_eq!(config.metadata_file, PathBuf::from("user_metadata.csv"));
    }

    #[test]
    fn export_requires_headless() {
        let result = Args::try_parse_from(["hmc-dashboard", "--export", "out.png"]);
        assert!(result.is_err());
        let args =
            Args::try_parse_from(["hmc-dashboard", "--headless", "--export", "out.png"]).unwrap();
        assert_eq!(args.export, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn page_flags_parse_with_headless() {
        let args = Args::try_parse_from([
            "hmc-dashboard",
            "--headless",
            "--page",
            "compare",
            "--other-user",
            "bob",
        ])
        .unwrap();
        assert_eq!(args.page.map(Page::from), Some(Page::CompareUsers));
        assert_eq!(args.other_user.as_deref(), Some("bob"));

        let args = Args::try_parse_from(["hmc-dashboard", "--headless", "--page", "sleep-spo2"])
            .unwrap();
        assert_eq!(args.page.map(Page::from), Some(Page::SleepSpo2));
        assert!(Args::try_parse_from(["hmc-dashboard", "--page", "bpm-stress"]).is_err());
    }
}
