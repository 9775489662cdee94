use std::io::Write;

use anyhow::{Context, Result};
use git2::Repository;
use remerge_core::{
    ConflictStyle, Remerge, ResolvedEntry, RevSpec, RunOptions, Settings, list_conflicts,
};

pub struct ApplyArgs {
    pub path: String,
    pub base: RevSpec,
    pub ours: RevSpec,
    pub theirs: RevSpec,
    pub dry_run: bool,
    pub no_checkout: bool,
    pub conflict: Option<ConflictStyle>,
    pub drop: Vec<String>,
    pub require_merge: bool,
}

pub fn apply(repo: &Repository, args: ApplyArgs, out: &mut impl Write) -> Result<()> {
    let mut settings = Settings::load(repo).context("failed to read git config")?;
    if let Some(style) = args.conflict {
        settings.conflict_style = style;
    }

    let remerge = Remerge::new(repo, settings);
    let plan = remerge
        .plan(&args.path, &args.base, &args.ours, &args.theirs, &args.drop)
        .with_context(|| format!("cannot build three-way entry for {}", args.path))?;

    if args.dry_run {
        write!(out, "{}", plan.index_info)?;
        return Ok(());
    }

    let outcome = remerge
        .run(
            &plan,
            &RunOptions {
                no_checkout: args.no_checkout,
                require_merge: args.require_merge,
            },
        )
        .with_context(|| format!("failed to record conflict for {}", plan.path))?;

    writeln!(out, "recorded {}:", outcome.path)?;
    let three_way = &plan.three_way;
    for (label, entry) in [
        ("base", &three_way.base),
        ("ours", &three_way.ours),
        ("theirs", &three_way.theirs),
    ] {
        write_stage(out, label, entry)?;
    }
    for source in &plan.dropped {
        writeln!(out, "cleared {}", source)?;
    }
    if outcome.checked_out {
        writeln!(out, "wrote {} with conflict markers", outcome.path)?;
    }
    Ok(())
}

fn write_stage(out: &mut impl Write, label: &str, entry: &ResolvedEntry) -> Result<()> {
    writeln!(
        out,
        "  {:<6} {} {} {}",
        label, entry.mode, entry.oid, entry.spec
    )?;
    Ok(())
}

pub fn status(repo: &Repository, json: bool, out: &mut impl Write) -> Result<()> {
    let index = repo.index()?;
    let conflicts = list_conflicts(&index)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &conflicts)?;
        writeln!(out)?;
        return Ok(());
    }

    if conflicts.is_empty() {
        writeln!(out, "no unmerged paths")?;
        return Ok(());
    }
    for conflict in &conflicts {
        let stages: Vec<String> = [
            (1, &conflict.ancestor),
            (2, &conflict.ours),
            (3, &conflict.theirs),
        ]
        .into_iter()
        .filter_map(|(stage, entry)| {
            entry
                .as_ref()
                .map(|e| format!(":{}:{} {}", stage, conflict.path, &e.oid[..7]))
        })
        .collect();
        writeln!(
            out,
            "{:<16} {}  [{}]",
            format!("{}:", conflict.kind),
            conflict.path,
            stages.join(", ")
        )?;
    }

    let halves = conflicts
        .iter()
        .filter(|conflict| conflict.kind.is_rename_candidate())
        .count();
    if halves > 0 {
        writeln!(
            out,
            "\n{} path(s) may be one half of an undetected rename; \
             pair them with `git-remerge apply`",
            halves
        )?;
    }
    Ok(())
}
