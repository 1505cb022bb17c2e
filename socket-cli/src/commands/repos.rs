//! `socket repos` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use socket_api::models::{RepoParams, RepoQuery, Repository, RepositoryList};
use socket_report::md_table;

use crate::cli::{RepoFields, ReposAction, ReposArgs};
use crate::commands::or_dash;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `repos` command.
pub async fn execute(
    args: ReposArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ReposAction::Create(args) => {
            let params = repo_params(Some(args.name.clone()), &args.fields)?;
            if ctx.bail_if_dry_run(format!("create repository {}", args.name), writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let org = ctx.resolve_org(&client).await?;
            let repo = client.create_repo(&org, &params).await?;
            info!(org = %org, repo = %repo.slug, "repository created");
            writer.render(&repo)
        }
        ReposAction::List(args) => {
            if ctx.bail_if_dry_run("list repositories", writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let org = ctx.resolve_org(&client).await?;
            let query = RepoQuery {
                sort: Some(args.sort),
                direction: Some(args.direction),
                per_page: Some(args.per_page),
                page: Some(args.page),
            };
            let list = client.list_repos(&org, &query).await?;
            writer.render(&list)
        }
        ReposAction::View { slug } => {
            if ctx.bail_if_dry_run(format!("view repository {slug}"), writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let org = ctx.resolve_org(&client).await?;
            let repo = client.view_repo(&org, &slug).await?;
            writer.render(&repo)
        }
        ReposAction::Update(args) => {
            let params = repo_params(args.name.clone(), &args.fields)?;
            if params == RepoParams::default() {
                return Err(CliError::Usage(
                    "nothing to update, pass at least one field".to_owned(),
                ));
            }
            if ctx.bail_if_dry_run(format!("update repository {}", args.slug), writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let org = ctx.resolve_org(&client).await?;
            let repo = client.update_repo(&org, &args.slug, &params).await?;
            info!(org = %org, repo = %repo.slug, "repository updated");
            writer.render(&repo)
        }
        ReposAction::Del { slug } => {
            if ctx.bail_if_dry_run(format!("delete repository {slug}"), writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let org = ctx.resolve_org(&client).await?;
            client.delete_repo(&org, &slug).await?;
            info!(org = %org, repo = %slug, "repository deleted");
            writer.render(&RepoDeleted {
                slug,
                deleted: true,
            })
        }
    }
}

fn repo_params(name: Option<String>, fields: &RepoFields) -> Result<RepoParams, CliError> {
    if let Some(visibility) = fields.visibility.as_deref() {
        if visibility != "public" && visibility != "private" {
            return Err(CliError::Usage(format!(
                "invalid visibility '{visibility}' (expected: public, private)"
            )));
        }
    }
    if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(CliError::Usage("repository name must not be empty".to_owned()));
    }
    Ok(RepoParams {
        name,
        description: fields.description.clone(),
        homepage: fields.homepage.clone(),
        default_branch: fields.default_branch.clone(),
        visibility: fields.visibility.clone(),
    })
}

#[derive(Serialize)]
pub struct RepoDeleted {
    pub slug: String,
    pub deleted: bool,
}

impl Render for RepoDeleted {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Deleted repository {}", self.slug)
    }
}

impl Render for Repository {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Name:           {}", self.name)?;
        writeln!(w, "Slug:           {}", self.slug)?;
        writeln!(w, "ID:             {}", self.id)?;
        writeln!(w, "Visibility:     {}", or_dash(Some(self.visibility.as_str())))?;
        writeln!(w, "Default branch: {}", or_dash(self.default_branch.as_deref()))?;
        writeln!(w, "Description:    {}", or_dash(self.description.as_deref()))?;
        writeln!(w, "Homepage:       {}", or_dash(self.homepage.as_deref()))?;
        writeln!(w, "Head scan:      {}", or_dash(self.head_full_scan_id.as_deref()))?;
        if self.archived {
            writeln!(w, "Archived")?;
        }
        Ok(())
    }
}

fn repo_rows(list: &RepositoryList) -> Vec<Vec<&str>> {
    list.results
        .iter()
        .map(|r| {
            vec![
                r.slug.as_str(),
                or_dash(Some(r.visibility.as_str())),
                or_dash(r.default_branch.as_deref()),
                r.updated_at.as_str(),
            ]
        })
        .collect()
}

impl Render for RepositoryList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.results.is_empty() {
            return writeln!(w, "No repositories.");
        }
        writeln!(w, "{:<32} {:<10} {:<16} Updated", "Repository", "Visibility", "Branch")?;
        writeln!(w, "{}", "-".repeat(84))?;
        for row in repo_rows(self) {
            writeln!(w, "{:<32} {:<10} {:<16} {}", row[0], row[1], row[2], row[3])?;
        }
        if let Some(next) = self.next_page {
            writeln!(w, "\nNext page: {next}")?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Repositories\n")?;
        write!(
            w,
            "{}",
            md_table(&["Repository", "Visibility", "Branch", "Updated"], &repo_rows(self))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputFormat, RepoUpdateArgs};
    use crate::commands::test_support::render;
    use crate::context::tests::context_for;
    use std::path::PathBuf;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_invalid_visibility_is_rejected() {
        let fields = RepoFields {
            visibility: Some("secret".to_owned()),
            ..RepoFields::default()
        };
        let err = repo_params(Some("web".to_owned()), &fields).expect_err("bad visibility");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_update_without_fields_is_usage_error() {
        let ctx = context_for("http://unused.invalid/v0/", PathBuf::from("unused.toml"));
        let args = ReposArgs {
            action: ReposAction::Update(RepoUpdateArgs {
                slug: "web".to_owned(),
                name: None,
                fields: RepoFields::default(),
            }),
        };
        let err = execute(args, &ctx, &OutputWriter::new(OutputFormat::Text))
            .await
            .expect_err("empty update");
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[tokio::test]
    async fn test_update_sends_only_given_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v0/orgs/acme/repos/web"))
            .and(body_json(serde_json::json!({"visibility": "private"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "r1", "slug": "web", "name": "web", "visibility": "private"
            })))
            .expect(1)
            .mount(&server)
            .await;
        let mut ctx = context_for(&format!("{}/v0/", server.uri()), PathBuf::from("unused.toml"));
        ctx.org_flag = Some("acme".to_owned());

        let args = ReposArgs {
            action: ReposAction::Update(RepoUpdateArgs {
                slug: "web".to_owned(),
                name: None,
                fields: RepoFields {
                    visibility: Some("private".to_owned()),
                    ..RepoFields::default()
                },
            }),
        };
        execute(args, &ctx, &OutputWriter::new(OutputFormat::Json))
            .await
            .expect("update succeeds");
    }

    #[tokio::test]
    async fn test_view_missing_repo_is_runtime_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/orgs/acme/repos/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"message": "Repository not found"}
            })))
            .mount(&server)
            .await;
        let mut ctx = context_for(&format!("{}/v0/", server.uri()), PathBuf::from("unused.toml"));
        ctx.org_flag = Some("acme".to_owned());

        let args = ReposArgs {
            action: ReposAction::View {
                slug: "nope".to_owned(),
            },
        };
        let err = execute(args, &ctx, &OutputWriter::new(OutputFormat::Json))
            .await
            .expect_err("404");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_failure().cause.as_deref(), Some("Repository not found"));
    }

    #[test]
    fn test_repository_list_markdown() {
        let list = RepositoryList {
            results: vec![Repository {
                slug: "web".to_owned(),
                visibility: "public".to_owned(),
                updated_at: "2024-05-01".to_owned(),
                ..Repository::default()
            }],
            next_page: None,
        };
        let md = render(OutputFormat::Markdown, &list);
        assert!(md.contains("| web"));
        assert!(md.contains("public"));
    }
}
