//! `socket organization` command handler

use std::io::Write;

use serde::Serialize;

use socket_api::models::{LicensePolicy, Organization, SecurityPolicy};
use socket_report::md_table;

use crate::cli::{OrganizationAction, OrganizationArgs, PolicyKind};
use crate::commands::or_dash;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `organization` command.
pub async fn execute(
    args: OrganizationArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        OrganizationAction::List => {
            if ctx.bail_if_dry_run("list organizations", writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let response = client.organizations().await?;
            let mut organizations: Vec<Organization> =
                response.organizations.into_values().collect();
            organizations.sort_by(|a, b| a.slug.cmp(&b.slug));
            writer.render(&OrganizationList { organizations })
        }
        OrganizationAction::Policy { kind } => {
            if ctx.bail_if_dry_run(format!("show {kind:?} policy").to_lowercase(), writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let org = ctx.resolve_org(&client).await?;
            match kind {
                PolicyKind::Security => {
                    let policy = client.security_policy(&org).await?;
                    writer.render(&SecurityPolicyView { org, policy })
                }
                PolicyKind::License => {
                    let policy = client.license_policy(&org).await?;
                    writer.render(&LicensePolicyView { org, policy })
                }
            }
        }
    }
}

#[derive(Serialize)]
pub struct OrganizationList {
    pub organizations: Vec<Organization>,
}

impl OrganizationList {
    fn rows(&self) -> Vec<Vec<&str>> {
        self.organizations
            .iter()
            .map(|o| {
                vec![
                    o.slug.as_str(),
                    or_dash(o.name.as_deref()),
                    o.id.as_str(),
                    o.plan.as_str(),
                ]
            })
            .collect()
    }
}

impl Render for OrganizationList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.organizations.is_empty() {
            return writeln!(w, "No organizations.");
        }
        writeln!(w, "{:<24} {:<30} {:<24} Plan", "Slug", "Name", "ID")?;
        writeln!(w, "{}", "-".repeat(86))?;
        for row in self.rows() {
            writeln!(w, "{:<24} {:<30} {:<24} {}", row[0], row[1], row[2], row[3])?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Organizations\n")?;
        write!(w, "{}", md_table(&["Slug", "Name", "ID", "Plan"], &self.rows()))
    }
}

#[derive(Serialize)]
pub struct SecurityPolicyView {
    pub org: String,
    pub policy: SecurityPolicy,
}

impl SecurityPolicyView {
    fn rows(&self) -> Vec<Vec<String>> {
        self.policy
            .security_policy_rules
            .iter()
            .map(|(alert_type, rule)| {
                vec![
                    alert_type.clone(),
                    rule.action
                        .map(|a| a.as_str().to_owned())
                        .unwrap_or_else(|| "-".to_owned()),
                ]
            })
            .collect()
    }
}

impl Render for SecurityPolicyView {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Security policy for {}", self.org)?;
        if let Some(default) = &self.policy.security_policy_default {
            writeln!(w, "Default: {default}")?;
        }
        writeln!(w)?;
        for row in self.rows() {
            writeln!(w, "{:<32} {}", row[0], row[1])?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Security policy for {}\n", self.org)?;
        if let Some(default) = &self.policy.security_policy_default {
            writeln!(w, "Default: {default}\n")?;
        }
        write!(w, "{}", md_table(&["Alert type", "Action"], &self.rows()))
    }
}

#[derive(Serialize)]
pub struct LicensePolicyView {
    pub org: String,
    pub policy: LicensePolicy,
}

impl LicensePolicyView {
    fn rows(&self) -> Vec<Vec<String>> {
        self.policy
            .0
            .iter()
            .map(|(license, setting)| {
                let setting = match setting {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                vec![license.clone(), setting]
            })
            .collect()
    }
}

impl Render for LicensePolicyView {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "License policy for {}\n", self.org)?;
        for row in self.rows() {
            writeln!(w, "{:<32} {}", row[0], row[1])?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# License policy for {}\n", self.org)?;
        write!(w, "{}", md_table(&["License", "Setting"], &self.rows()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::commands::test_support::render;
    use crate::context::tests::context_for;
    use std::path::PathBuf;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_security_policy_markdown() {
        let policy: SecurityPolicy = serde_json::from_value(serde_json::json!({
            "securityPolicyRules": {
                "didYouMean": {"action": "error"},
                "networkAccess": {"action": "warn"}
            },
            "securityPolicyDefault": "medium"
        }))
        .expect("valid policy");
        let view = SecurityPolicyView {
            org: "acme".to_owned(),
            policy,
        };

        let md = render(OutputFormat::Markdown, &view);
        assert!(md.starts_with("# Security policy for acme"));
        assert!(md.contains("| didYouMean"));
        assert!(md.contains("error"));
        assert!(md.contains("Default: medium"));
    }

    #[test]
    fn test_organization_list_text() {
        let list = OrganizationList {
            organizations: vec![Organization {
                id: "o1".to_owned(),
                name: None,
                image: None,
                plan: "team".to_owned(),
                slug: "acme".to_owned(),
            }],
        };
        let text = render(OutputFormat::Text, &list);
        assert!(text.contains("acme"));
        assert!(text.contains("team"));
    }

    #[tokio::test]
    async fn test_license_policy_uses_org_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/orgs/globex/settings/license-policy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "MIT": "allow",
                "GPL-3.0": {"action": "deny"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut ctx = context_for(&format!("{}/v0/", server.uri()), PathBuf::from("unused.toml"));
        ctx.org_flag = Some("globex".to_owned());

        let args = OrganizationArgs {
            action: OrganizationAction::Policy {
                kind: PolicyKind::License,
            },
        };
        execute(args, &ctx, &OutputWriter::new(OutputFormat::Json))
            .await
            .expect("policy fetched");
    }
}
