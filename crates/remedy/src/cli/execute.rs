//! Command execution logic.

use super::args::{CabinetArgs, CheckpointArgs, PrescribeArgs, TagsArgs};
use crate::app::App;
use crate::checkpoint::CheckpointFile;
use crate::release::{self, Prescription};
use crate::{cabinet, output};
use anyhow::{Result, bail};
use regex::Regex;

/// Execute the list command.
pub(super) fn list(app: &App) -> Result<()> {
    output::print_repositories(app.graph());
    Ok(())
}

/// Execute the tags command.
pub(super) async fn tags(app: &App, args: &TagsArgs) -> Result<()> {
    let repo = app.graph.find_repo(&args.repo)?;
    let tags = if args.up {
        repo.upgrades(app.vcs.as_ref()).await?
    } else if args.down {
        repo.downgrades(app.vcs.as_ref()).await?
    } else {
        repo.tags(app.vcs.as_ref()).await?
    };
    output::print_tags(&tags);
    Ok(())
}

/// Execute the prescribe command.
pub(super) async fn prescribe(app: &App, args: &PrescribeArgs) -> Result<()> {
    let prescription = Prescription {
        build: args.build,
        test: args.test,
        install: args.install,
        link: args.link,
        cascade: args.cascade,
        rollback: args.rollback,
    };
    release::prescribe(
        &app.graph,
        app.vcs.as_ref(),
        app.runner.as_ref(),
        &args.repo,
        &args.rev,
        &prescription,
    )
    .await?;
    Ok(())
}

/// Execute the cabinet command.
pub(super) async fn cabinet(app: &mut App, args: &CabinetArgs) -> Result<()> {
    let repo = app.graph.find_repo(&args.repo)?.clone();

    if args.build {
        cabinet::build(
            &app.graph,
            app.vcs.as_ref(),
            app.runner.as_ref(),
            &repo,
            args.id.as_deref(),
            args.test,
        )
        .await?;
    } else if args.open {
        cabinet::open(
            &mut app.graph,
            app.catalog.as_ref(),
            app.vcs.as_ref(),
            &repo.root,
            args.id.as_deref(),
        )
        .await?;
    } else if args.dump {
        if args.id.is_none() {
            bail!("must specify <id> to dump");
        }
        let (_, data) = cabinet::load_unique(&repo.root, args.id.as_deref()).await?;
        output::print_cabinet(&data);
    } else {
        for path in cabinet::list_files(&repo.root, args.id.as_deref()).await? {
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Execute the checkpoint command.
pub(super) async fn checkpoint(app: &mut App, args: &CheckpointArgs) -> Result<()> {
    let path = app.config.checkpoint_path();
    let mut data = CheckpointFile::load(&path).await?;

    let filter = Regex::new(&args.filter)?;
    let exclude = Regex::new(&args.exclude)?;

    if let Some(comment) = &args.save {
        data.save(&app.graph, app.vcs.as_ref(), comment, &filter, &exclude)
            .await?;
        data.store(&path).await?;
    } else if let Some(id) = args.apply {
        data.apply(
            &mut app.graph,
            app.catalog.as_ref(),
            app.vcs.as_ref(),
            id,
            &filter,
            &exclude,
        )
        .await?;
    } else if let Some(id) = args.delete {
        data.delete(id)?;
        data.store(&path).await?;
    } else {
        output::print_checkpoints(&data, args.count);
    }
    Ok(())
}
