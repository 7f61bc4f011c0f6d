use ba_admin_core::controllers::ConfigForm;
use ba_admin_core::gateway_cache::DomainDisplay;
use ba_admin_core::session::{ConfigSaveOutcome, EnvironmentOutcome};
use ba_admin_core::view::ServerOptionsView;
use ba_admin_core::{AdminSession, Result};

use crate::cli::{BalanceCommand, Command, ConfigCommand, PasswordCommand};
use crate::console::describe_config;

/// Run one command and report whether it succeeded. The session's view has
/// already printed the details.
pub async fn run(session: &AdminSession, command: Command) -> Result<bool> {
    let ok = match command {
        Command::Config(ConfigCommand::Show) => match session.config_store().load() {
            Some(config) => {
                println!("{}", describe_config(&config));
                true
            }
            None => {
                println!("No config stored");
                false
            }
        },
        Command::Config(ConfigCommand::Set {
            server,
            namespace,
            username,
            password,
        }) => {
            let form = ConfigForm {
                server_address: server,
                namespace,
                username,
                password,
            };
            matches!(
                session.save_config_form(form).await?.into_inner(),
                ConfigSaveOutcome::Saved { .. }
            )
        }
        Command::Config(ConfigCommand::Env { name }) => matches!(
            session.switch_environment(&name).await?.into_inner(),
            EnvironmentOutcome::Switched(_)
        ),
        Command::Gateway => matches!(
            session.resolve_gateway().await?.into_inner(),
            DomainDisplay::Resolved { .. } | DomainDisplay::Cached { .. }
        ),
        Command::Servers { .. } => !matches!(
            session.load_server_options().await?.into_inner(),
            ServerOptionsView::Failed(_)
        ),
        Command::Balance(BalanceCommand::Get { phone }) => {
            session.query_balance(&phone).await?.into_inner().is_success()
        }
        Command::Balance(BalanceCommand::Set { phone, amount }) => session
            .update_balance(&phone, &amount)
            .await?
            .into_inner()
            .is_success(),
        Command::Password(PasswordCommand::Verify { phone, password }) => session
            .verify_password(&phone, &password)
            .await?
            .into_inner()
            .is_success(),
        Command::Password(PasswordCommand::Set {
            phone,
            new_password,
        }) => session
            .update_password(&phone, &new_password)
            .await?
            .into_inner()
            .is_success(),
    };
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use ba_admin_core::SessionDeps;
    use ba_admin_core::config_store::{ConfigKind, ConfigPayload};
    use ba_admin_core::testing::{ManualClock, ScriptedTransport};
    use ba_admin_core::transport::ApiResponse;
    use ba_api_types::{GET_BALANCE, GET_GATEWAY_URL, GET_NACOS_CONFIGS, SAVE_NACOS_CONFIG};
    use ba_storage::InMemorySlotStore;

    use super::*;
    use crate::console::{ConsoleNotifier, ConsoleView};

    struct Fixture {
        transport: Rc<ScriptedTransport>,
        view: Rc<ConsoleView<Vec<u8>>>,
        notifier: Rc<ConsoleNotifier<Vec<u8>>>,
        session: AdminSession,
    }

    fn fixture(filter: Option<&str>) -> Fixture {
        let transport = Rc::new(ScriptedTransport::new());
        let view = Rc::new(ConsoleView::new(Vec::new(), filter.map(str::to_owned)));
        let notifier = Rc::new(ConsoleNotifier::new(Vec::new()));
        let session = AdminSession::new(SessionDeps {
            slots: Rc::new(InMemorySlotStore::new()),
            transport: transport.clone(),
            view: view.clone(),
            notifier: notifier.clone(),
            clock: Rc::new(ManualClock::new(1_700_000_000_000)),
        });
        Fixture {
            transport,
            view,
            notifier,
            session,
        }
    }

    fn configure(f: &Fixture) {
        f.session
            .config_store()
            .save(
                ConfigKind::Nacos,
                ConfigPayload::nacos("10.0.0.1:8848", "server", "", ""),
            )
            .unwrap();
    }

    #[tokio::test]
    async fn balance_get_prints_outcome() {
        let f = fixture(None);
        configure(&f);
        f.transport.respond(
            GET_BALANCE,
            ApiResponse::ok(r#"{"success":true,"data":{"balance":42}}"#),
        );

        let ok = run(
            &f.session,
            Command::Balance(BalanceCommand::Get {
                phone: "13800000000".into(),
            }),
        )
        .await
        .unwrap();

        assert!(ok);
        assert!(f.view.output().contains("Current balance: 42"));
    }

    #[tokio::test]
    async fn invalid_phone_fails_without_request() {
        let f = fixture(None);

        let ok = run(
            &f.session,
            Command::Balance(BalanceCommand::Get {
                phone: "123".into(),
            }),
        )
        .await
        .unwrap();

        assert!(!ok);
        assert!(f.transport.requests().is_empty());
        assert!(f.notifier.output().starts_with("[warning]"));
    }

    #[tokio::test]
    async fn config_set_registers_new_server() {
        let f = fixture(None);
        f.transport.respond(GET_NACOS_CONFIGS, ApiResponse::ok("[]"));
        f.transport
            .respond(SAVE_NACOS_CONFIG, ApiResponse::ok(r#"{"success":true}"#));
        f.transport.respond(
            GET_GATEWAY_URL,
            ApiResponse::ok(r#"{"success":true,"gateway_url":"gw.example.com"}"#),
        );

        let ok = run(
            &f.session,
            Command::Config(ConfigCommand::Set {
                server: "10.0.0.9:8848".into(),
                namespace: "server".into(),
                username: String::new(),
                password: String::new(),
            }),
        )
        .await
        .unwrap();

        assert!(ok);
        assert_eq!(f.transport.requests_to(SAVE_NACOS_CONFIG).len(), 1);
        let stored = f.session.config_store().load().unwrap();
        assert_eq!(stored.data.server_address(), Some("10.0.0.9:8848"));
        assert!(f.view.output().contains("gateway: gw.example.com"));
    }

    #[tokio::test]
    async fn servers_prints_filtered_list() {
        let f = fixture(Some("10.0"));
        f.transport.respond(
            GET_NACOS_CONFIGS,
            ApiResponse::ok(
                r#"[{"server_addresses":"10.0.0.1:8848","env":"prod"},{"server_addresses":"192.168.1.5:8848"}]"#,
            ),
        );

        let ok = run(&f.session, Command::Servers { filter: None })
            .await
            .unwrap();

        assert!(ok);
        let out = f.view.output();
        assert!(out.contains("10.0.0.1:8848"));
        assert!(!out.contains("192.168.1.5"));
    }

    #[tokio::test]
    async fn gateway_without_config_fails() {
        let f = fixture(None);

        let ok = run(&f.session, Command::Gateway).await.unwrap();

        assert!(!ok);
        assert!(f.view.output().contains("Nacos not configured"));
        assert!(f.transport.requests().is_empty());
    }
}
