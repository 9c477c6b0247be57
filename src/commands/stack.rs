//! `swarmctl stack services`

use super::{exact_args, Cli};
use crate::client::FilterSet;
use crate::error::{Result, SwarmctlError};
use crate::formatter::service::{self, ServiceContext};
use crate::formatter::{list_format, resolve_list_format, Renderer};
use crate::swarm::service::STACK_NAMESPACE_LABEL;
use clap::Args;
use std::collections::HashMap;
use std::io::Write;
use tracing::debug;

#[derive(Args, Debug, Clone, Default)]
pub struct ServicesOptions {
    /// Stack name
    #[arg(value_name = "STACK")]
    pub args: Vec<String>,

    /// Only display IDs
    #[arg(short, long)]
    pub quiet: bool,

    /// Format output using a custom template ('table', 'table TEMPLATE', 'json' or TEMPLATE)
    #[arg(long)]
    pub format: Option<String>,
}

/// A stack name is valid if anything remains after stripping whitespace
/// and quote characters from both ends
fn validate_stack_name(namespace: &str) -> Result<()> {
    let trimmed = namespace.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'');
    if trimmed.is_empty() {
        return Err(SwarmctlError::InvalidStackName(namespace.to_string()));
    }
    Ok(())
}

/// List the services of a stack
pub async fn run_services<O: Write, E: Write>(
    cli: &mut Cli<O, E>,
    opts: &ServicesOptions,
) -> Result<()> {
    exact_args("stack services", &opts.args, 1)?;
    let namespace = opts.args[0].as_str();
    validate_stack_name(namespace)?;

    let source = resolve_list_format(
        opts.format.as_deref(),
        cli.config_file().services_format.as_deref(),
        opts.quiet,
    );
    let format = list_format(&source, opts.quiet, service::DEFAULT_TABLE_FORMAT);
    let renderer = Renderer::new(&format, &service::SCHEMA)?;

    let client = cli.client();
    let filters = FilterSet::new().with(
        "label",
        &format!("{}={}", STACK_NAMESPACE_LABEL, namespace),
    );
    let mut services = client.list_services(&filters).await?;
    if services.is_empty() {
        writeln!(cli.err(), "Nothing found in stack: {}", namespace)?;
        return Ok(());
    }
    services.sort_by(|a, b| a.spec.name.cmp(&b.spec.name));
    debug!("stack {} has {} services", namespace, services.len());

    let info = if opts.quiet {
        HashMap::new()
    } else {
        let nodes = client.list_nodes(&FilterSet::new()).await?;
        let task_filters = services
            .iter()
            .fold(FilterSet::new(), |filters, s| filters.with("service", &s.id));
        let tasks = client.list_tasks(&task_filters).await?;
        service::services_status(&services, &nodes, &tasks)
    };

    let rows: Vec<ServiceContext> = services
        .iter()
        .map(|s| ServiceContext::new(s, info.get(&s.id)))
        .collect();
    renderer.render(&rows, cli.out())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{output, test_cli};
    use crate::config::CliConfig;
    use crate::swarm::{NodeState, TaskState};
    use crate::testutil::{global_service, node, replicated_service, task, FakeClient};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn opts(args: &[&str]) -> ServicesOptions {
        ServicesOptions {
            args: args.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    fn shop_client() -> FakeClient {
        FakeClient::new()
            .with_service_list(|filters| {
                assert_eq!(
                    filters.get("label"),
                    vec!["com.docker.stack.namespace=shop".to_string()]
                );
                let mut web = replicated_service("svc-web", "shop_web", 2);
                web.endpoint.ports = vec![crate::swarm::PortConfig {
                    published_port: 8080,
                    target_port: 80,
                    ..Default::default()
                }];
                Ok(vec![web, global_service("svc-agent", "shop_agent")])
            })
            .with_node_list(|_| Ok(vec![node("n1", NodeState::Ready)]))
            .with_task_list(|filters| {
                assert_eq!(
                    filters.get("service"),
                    vec!["svc-agent".to_string(), "svc-web".to_string()]
                );
                Ok(vec![
                    task("t1", "svc-web", "n1", TaskState::Running, TaskState::Running),
                    task("t2", "svc-agent", "n1", TaskState::Running, TaskState::Running),
                ])
            })
    }

    #[tokio::test]
    async fn test_default_table() {
        let mut cli = test_cli(Arc::new(shop_client()), CliConfig::default());

        run_services(&mut cli, &opts(&["shop"])).await.unwrap();

        let (out, err) = output(cli);
        assert_eq!(
            out,
            concat!(
                "ID          NAME         MODE         REPLICAS   IMAGE            PORTS\n",
                "svc-agent   shop_agent   global       1/1        busybox:latest   \n",
                "svc-web     shop_web     replicated   1/2        busybox:latest   *:8080->80/tcp\n",
            )
        );
        assert_eq!(err, "");
    }

    #[tokio::test]
    async fn test_quiet_skips_status_lookups() {
        let fake = Arc::new(shop_client());
        let mut cli = test_cli(fake.clone(), CliConfig::default());
        let mut options = opts(&["shop"]);
        options.quiet = true;

        run_services(&mut cli, &options).await.unwrap();

        let (out, _) = output(cli);
        assert_eq!(out, "svc-agent\nsvc-web\n");
        assert_eq!(fake.calls(), vec!["list_services".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_order() {
        let fake = Arc::new(shop_client());
        let mut cli = test_cli(fake.clone(), CliConfig::default());

        run_services(&mut cli, &opts(&["shop"])).await.unwrap();

        assert_eq!(
            fake.calls(),
            vec![
                "list_services".to_string(),
                "list_nodes".to_string(),
                "list_tasks".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_equal_names_keep_api_order() {
        let fake = FakeClient::new()
            .with_service_list(|_| {
                Ok(vec![
                    replicated_service("svc-3", "shop_web", 1),
                    replicated_service("svc-2", "shop_api", 1),
                    replicated_service("svc-1", "shop_web", 1),
                ])
            })
            .with_node_list(|_| Ok(vec![]))
            .with_task_list(|_| Ok(vec![]));
        let mut cli = test_cli(Arc::new(fake), CliConfig::default());
        let mut options = opts(&["shop"]);
        options.format = Some("{{.Name}} {{.ID}}".to_string());

        run_services(&mut cli, &options).await.unwrap();

        let (out, _) = output(cli);
        assert_eq!(out, "shop_api svc-2\nshop_web svc-3\nshop_web svc-1\n");
    }

    #[tokio::test]
    async fn test_format_flag_beats_config_file() {
        let config_file = CliConfig {
            services_format: Some("{{.ID}}: {{.Mode}}".to_string()),
            ..Default::default()
        };

        let mut cli = test_cli(Arc::new(shop_client()), config_file.clone());
        run_services(&mut cli, &opts(&["shop"])).await.unwrap();
        let (out, _) = output(cli);
        assert_eq!(out, "svc-agent: global\nsvc-web: replicated\n");

        let mut cli = test_cli(Arc::new(shop_client()), config_file);
        let mut options = opts(&["shop"]);
        options.format = Some("{{.Name}}".to_string());
        run_services(&mut cli, &options).await.unwrap();
        let (out, _) = output(cli);
        assert_eq!(out, "shop_agent\nshop_web\n");
    }

    #[tokio::test]
    async fn test_quiet_ignores_config_file_format() {
        let config_file = CliConfig {
            services_format: Some("{{.Name}}".to_string()),
            ..Default::default()
        };
        let mut cli = test_cli(Arc::new(shop_client()), config_file);
        let mut options = opts(&["shop"]);
        options.quiet = true;

        run_services(&mut cli, &options).await.unwrap();

        let (out, _) = output(cli);
        assert_eq!(out, "svc-agent\nsvc-web\n");
    }

    #[tokio::test]
    async fn test_json_format() {
        let mut cli = test_cli(Arc::new(shop_client()), CliConfig::default());
        let mut options = opts(&["shop"]);
        options.format = Some("json".to_string());

        run_services(&mut cli, &options).await.unwrap();

        let (out, _) = output(cli);
        let first = out.lines().next().unwrap();
        assert_eq!(
            first,
            r#"{"ID":"svc-agent","Name":"shop_agent","Mode":"global","Replicas":"1/1","Image":"busybox:latest","Ports":""}"#
        );
        assert_eq!(out.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_empty_stack() {
        let fake = Arc::new(FakeClient::new());
        let mut cli = test_cli(fake.clone(), CliConfig::default());

        run_services(&mut cli, &opts(&["nothing"])).await.unwrap();

        let (out, err) = output(cli);
        assert_eq!(out, "");
        assert_eq!(err, "Nothing found in stack: nothing\n");
        assert_eq!(fake.calls(), vec!["list_services".to_string()]);
    }

    #[tokio::test]
    async fn test_argument_errors() {
        for args in [&[][..], &["a", "b"][..]] {
            let fake = Arc::new(FakeClient::new());
            let mut cli = test_cli(fake.clone(), CliConfig::default());

            let err = run_services(&mut cli, &opts(args)).await.unwrap_err();
            assert_eq!(
                err.to_string(),
                "\"swarmctl stack services\" requires exactly 1 argument"
            );
            assert!(fake.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_invalid_stack_name() {
        for name in ["", "  ", "'\"'"] {
            let fake = Arc::new(FakeClient::new());
            let mut cli = test_cli(fake.clone(), CliConfig::default());

            let err = run_services(&mut cli, &opts(&[name])).await.unwrap_err();
            assert_eq!(err.to_string(), format!("invalid stack name: {:?}", name));
            assert!(fake.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_bad_template_fails_before_lookup() {
        let fake = Arc::new(shop_client());
        let mut cli = test_cli(fake.clone(), CliConfig::default());
        let mut options = opts(&["shop"]);
        options.format = Some("{{invalid format}}".to_string());

        let err = run_services(&mut cli, &options).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "template parsing error: template: :1: function \"invalid\" not defined"
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_errors_propagate() {
        let fake = FakeClient::new()
            .with_service_list(|_| Ok(vec![replicated_service("svc-1", "web", 1)]))
            .with_node_list(|_| Err(SwarmctlError::Api("error getting nodes".to_string())));
        let mut cli = test_cli(Arc::new(fake), CliConfig::default());

        let err = run_services(&mut cli, &opts(&["shop"])).await.unwrap_err();

        assert_eq!(err.to_string(), "error getting nodes");
        let (out, _) = output(cli);
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_task_list_error_propagates() {
        let fake = FakeClient::new()
            .with_service_list(|_| Ok(vec![replicated_service("svc-1", "web", 1)]))
            .with_task_list(|_| Err(SwarmctlError::Api("error getting tasks".to_string())));
        let fake = Arc::new(fake);
        let mut cli = test_cli(fake.clone(), CliConfig::default());

        let err = run_services(&mut cli, &opts(&["shop"])).await.unwrap_err();

        assert_eq!(err.to_string(), "error getting tasks");
        assert_eq!(
            fake.calls(),
            vec![
                "list_services".to_string(),
                "list_nodes".to_string(),
                "list_tasks".to_string()
            ]
        );
    }
}
