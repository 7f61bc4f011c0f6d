use clap::{Parser, Subcommand};

/// Operate the balance backend from a terminal.
#[derive(Debug, Parser)]
#[command(name = "balance-admin", version)]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, env = "BALANCE_ADMIN_URL")]
    pub base_url: Option<String>,
    /// Directory of the local config and gateway cache.
    #[arg(long, env = "BALANCE_ADMIN_STATE", default_value = ".balance-admin")]
    pub state_dir: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or change the stored connection config.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Resolve the current gateway domain.
    Gateway,
    /// List Nacos servers known to the backend.
    Servers {
        #[arg(long)]
        filter: Option<String>,
    },
    #[command(subcommand)]
    Balance(BalanceCommand),
    #[command(subcommand)]
    Password(PasswordCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    Show,
    /// Store a Nacos config, registering the server with the backend if new.
    Set {
        #[arg(long)]
        server: String,
        #[arg(long, default_value = "")]
        namespace: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Switch the backend environment.
    Env { name: String },
}

#[derive(Debug, Subcommand)]
pub enum BalanceCommand {
    Get {
        phone: String,
    },
    Set {
        phone: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    Verify { phone: String, password: String },
    Set { phone: String, new_password: String },
}

impl Command {
    /// Address filter applied when printing the server list.
    pub fn server_filter(&self) -> Option<String> {
        match self {
            Command::Servers { filter } => filter.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_config_set_with_defaults() {
        let cli = Cli::try_parse_from([
            "balance-admin",
            "--state-dir",
            "/tmp/state",
            "config",
            "set",
            "--server",
            "10.0.0.1:8848",
        ])
        .unwrap();
        assert_eq!(cli.state_dir, "/tmp/state");
        match cli.command {
            Command::Config(ConfigCommand::Set {
                server, namespace, ..
            }) => {
                assert_eq!(server, "10.0.0.1:8848");
                assert_eq!(namespace, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_amounts_are_not_flags() {
        let cli = Cli::try_parse_from(["balance-admin", "balance", "set", "13800000000", "-5"]).unwrap();
        match cli.command {
            Command::Balance(BalanceCommand::Set { amount, .. }) => assert_eq!(amount, "-5"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn only_servers_carries_a_filter() {
        let cli = Cli::try_parse_from(["balance-admin", "servers", "--filter", "10.0"]).unwrap();
        assert_eq!(cli.command.server_filter().as_deref(), Some("10.0"));
        let cli = Cli::try_parse_from(["balance-admin", "gateway"]).unwrap();
        assert_eq!(cli.command.server_filter(), None);
    }
}
