//! `create-advisory`: draft or create the next advisory for the group's series

use crate::clients::{AdvisoryDraft, AdvisorySummary, Impetus};
use crate::core::context::RunContext;
use crate::core::error::{RailError, RailResult, RemoteError, Service};
use crate::engine::model::BuildKind;
use crate::release::next_release_date;
use crate::utils::{parse_release_date, validate_email};
use chrono::NaiveDate;
use serde::Serialize;

/// Validated `create-advisory` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAdvisoryRequest {
  pub kind: BuildKind,
  pub impetus: Impetus,
  pub date: Option<NaiveDate>,
  pub assigned_to: String,
  pub manager: String,
  pub package_owner: String,
  pub yes: bool,
  pub json: bool,
}

/// Raw `create-advisory` flags before validation
#[derive(Debug, Clone)]
pub struct CreateAdvisoryArgs {
  pub kind: BuildKind,
  pub impetus: Impetus,
  pub date: Option<String>,
  pub assigned_to: String,
  pub manager: String,
  pub package_owner: String,
  pub yes: bool,
  pub json: bool,
}

impl CreateAdvisoryRequest {
  pub fn from_args(args: CreateAdvisoryArgs) -> RailResult<Self> {
    Ok(Self {
      kind: args.kind,
      impetus: args.impetus,
      date: args.date.as_deref().map(parse_release_date).transpose()?,
      assigned_to: validate_email("assigned-to", &args.assigned_to)?,
      manager: validate_email("manager", &args.manager)?,
      package_owner: validate_email("package-owner", &args.package_owner)?,
      yes: args.yes,
      json: args.json,
    })
  }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum CreateOutput<'a> {
  Draft { draft: &'a AdvisoryDraft },
  Created { advisory: &'a AdvisorySummary },
}

/// Run `create-advisory`
pub fn run_create_advisory(ctx: &RunContext, request: CreateAdvisoryRequest) -> RailResult<()> {
  let draft = build_draft(ctx, &request)?;

  if !request.yes {
    if request.json {
      println!("{}", serde_json::to_string_pretty(&CreateOutput::Draft { draft: &draft })?);
    } else {
      print_draft(&draft);
      println!();
      println!("Dry run: no advisory created. Re-run with --yes to create it.");
    }
    return Ok(());
  }

  let created = create(ctx, &draft)?;
  if request.json {
    println!(
      "{}",
      serde_json::to_string_pretty(&CreateOutput::Created { advisory: &created })?
    );
  } else {
    println!("✅ Created advisory {}", created.id);
    println!("   Synopsis:     {}", created.synopsis);
    println!("   Release date: {}", created.release_date);
    if let Some(url) = &created.url {
      println!("   URL:          {}", url);
    }
  }
  Ok(())
}

/// Assemble the draft, looking up the previous advisory when no date was given
pub fn build_draft(ctx: &RunContext, request: &CreateAdvisoryRequest) -> RailResult<AdvisoryDraft> {
  let series = ctx.config.group.stream()?.series();

  let release_date = match request.date {
    Some(date) => date,
    None => {
      let latest = ctx.advisories.latest_advisory(request.kind, &series)?.ok_or_else(|| {
        RailError::Remote(RemoteError::NotFound {
          service: Service::Advisory,
          resource: format!("latest {} advisory for {}", request.kind, series),
        })
      })?;
      let next = next_release_date(latest.release_date);
      tracing::info!(previous = latest.id, previous_date = %latest.release_date, %next, "computed release date");
      next
    }
  };

  Ok(AdvisoryDraft {
    kind: request.kind,
    impetus: request.impetus,
    synopsis: AdvisoryDraft::synopsis_for(request.kind, &series),
    release_date,
    series,
    assigned_to: request.assigned_to.clone(),
    manager: request.manager.clone(),
    package_owner: request.package_owner.clone(),
  })
}

fn create(ctx: &RunContext, draft: &AdvisoryDraft) -> RailResult<AdvisorySummary> {
  ctx.advisories.check_auth()?;
  let created = ctx.advisories.create_advisory(draft)?;
  tracing::info!(advisory = created.id, "created advisory");
  Ok(created)
}

fn print_draft(draft: &AdvisoryDraft) {
  println!("📝 Advisory draft ({}, {:?})", draft.kind, draft.impetus);
  println!("   Synopsis:      {}", draft.synopsis);
  println!("   Release date:  {}", draft.release_date);
  println!("   Assigned to:   {}", draft.assigned_to);
  println!("   Manager:       {}", draft.manager);
  println!("   Package owner: {}", draft.package_owner);
}
