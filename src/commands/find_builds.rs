//! `find-builds`: discover, filter and optionally attach viable builds

use crate::core::context::RunContext;
use crate::core::error::{RailError, RailResult};
use crate::engine::ResolutionEngine;
use crate::engine::attach::{self, ApplyReport};
use crate::engine::model::{AdvisoryTarget, BuildKind, DiscoveryMode};
use crate::ui::progress::StageProgress;
use serde::Serialize;
use std::io::IsTerminal;

/// Validated `find-builds` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindBuildsRequest {
  pub kind: BuildKind,
  pub mode: DiscoveryMode,
  pub target: Option<AdvisoryTarget>,
  pub workers: Option<usize>,
  pub json: bool,
}

impl FindBuildsRequest {
  pub fn from_args(
    kind: BuildKind,
    builds: Vec<String>,
    attach: Option<u64>,
    workers: Option<usize>,
    json: bool,
  ) -> RailResult<Self> {
    if workers == Some(0) {
      return Err(RailError::with_help(
        "--workers must be at least 1",
        "Omit --workers to use one worker per CPU",
      ));
    }

    let builds: Vec<String> = builds
      .into_iter()
      .map(|b| b.trim().to_string())
      .filter(|b| !b.is_empty())
      .collect();
    let mode = if builds.is_empty() {
      DiscoveryMode::Automatic(kind)
    } else {
      DiscoveryMode::Manual(builds)
    };

    Ok(Self {
      kind,
      mode,
      target: attach.map(AdvisoryTarget),
      workers,
      json,
    })
  }
}

/// Everything `find-builds` reports
#[derive(Debug, Serialize)]
pub struct FindBuildsOutput {
  pub kind: BuildKind,
  pub product_version: String,
  #[serde(flatten)]
  pub report: ApplyReport,
}

/// Run `find-builds`, printing the result
pub fn run_find_builds(ctx: &RunContext, request: FindBuildsRequest) -> RailResult<()> {
  let progress = if !request.json && std::io::stderr().is_terminal() {
    StageProgress::visible()
  } else {
    StageProgress::silent()
  };

  let output = find_builds(ctx, &request, &progress)?;

  if request.json {
    println!("{}", serde_json::to_string_pretty(&output)?);
  } else {
    print_output(&output);
  }

  output.report.ensure_success()
}

/// Auth check, resolution and attachment without any printing
pub fn find_builds(ctx: &RunContext, request: &FindBuildsRequest, progress: &StageProgress) -> RailResult<FindBuildsOutput> {
  ctx.advisories.check_auth()?;

  let group = &ctx.config.group;
  let tags = group.tags()?;
  tracing::info!(
    kind = %request.kind,
    candidate_tag = %tags.candidate_tag,
    product_version = %tags.product_version,
    manual = matches!(request.mode, DiscoveryMode::Manual(_)),
    "finding builds"
  );

  let engine = ResolutionEngine::new(
    ctx.build_system.as_ref(),
    ctx.advisories.as_ref(),
    ctx.worker_pool(request.workers),
  );
  let set = engine.find_viable_builds(&tags, &request.mode, &group.non_release, &group.images, progress)?;
  let report = attach::apply(engine.advisories(), &set, request.target)?;

  Ok(FindBuildsOutput {
    kind: request.kind,
    product_version: tags.product_version,
    report,
  })
}

fn print_output(output: &FindBuildsOutput) {
  match &output.report {
    ApplyReport::Preview(preview) => {
      if preview.builds.is_empty() {
        println!("✅ No viable {} builds for {}", output.kind, output.product_version);
        return;
      }

      println!(
        "📋 {} viable {} build(s) for {}",
        preview.builds.len(),
        output.kind,
        output.product_version
      );
      println!();
      for build in preview.builds.builds() {
        println!("   {} (build {})", build.nvr(), build.build_id());
      }
      println!();
      println!("Dry run: nothing attached. Re-run with --attach <ADVISORY> to attach these builds.");
    }
    ApplyReport::Attached(report) => {
      if report.attached.is_empty() && report.failed.is_empty() && report.aborted.is_none() {
        println!("✅ No viable {} builds to attach to advisory {}", output.kind, report.advisory);
        return;
      }

      println!(
        "📎 Advisory {}: {} attached, {} failed",
        report.advisory,
        report.attached.len(),
        report.failed.len()
      );
      println!();
      for build in &report.attached {
        println!("   ✅ {}", build.nvr());
      }
      for failure in &report.failed {
        println!("   ❌ {}: {}", failure.build.nvr(), failure.reason);
      }
      if let Some(aborted) = &report.aborted {
        println!("   🚫 {}: {}", aborted.build.nvr(), aborted.reason);
        for build in &report.not_attempted {
          println!("   ⏭️  {} (not attempted)", build.nvr());
        }
      }
      println!();
    }
  }
}
