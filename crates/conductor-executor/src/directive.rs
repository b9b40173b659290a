//! Directive rendering.
//!
//! Each phase has a minijinja template for the prompt. Templates are rendered
//! against:
//!
//! - `task_id`: the task the step belongs to
//! - `phase`, `operation`: identifiers (`coder`, `implement`)
//! - `label`: readable operation name (`review quality`)
//! - `purpose`: the operation's description from the capability table
//! - `input`: the operation payload, e.g. `{{ input.description }}`
//! - `input_json`: the payload as pretty-printed JSON
//! - `output_fields`: the fields the engine looks for in the response

use std::collections::BTreeMap;

use conductor_capability::table;
use conductor_provider::Directive;
use conductor_task::Phase;
use minijinja::{Environment, Value};
use serde::Serialize;

use crate::error::StepError;
use crate::request::PhaseRequest;

const ORCHESTRATOR_TEMPLATE: &str = "\
Task {{ task_id }}: {{ purpose }}.

{% if input.description %}Request:
{{ input.description }}

{% endif %}Input:
{{ input_json }}

Respond with a single JSON object with the fields: {{ output_fields | join(\", \") }}.";

const ARCHITECT_TEMPLATE: &str = "\
Task {{ task_id }}: {{ purpose }}.

Plan and requirements:
{{ input_json }}

Respond with a single JSON object with the fields: {{ output_fields | join(\", \") }}.
Put the design document in `content`.";

const CODER_TEMPLATE: &str = "\
Task {{ task_id }}: {{ purpose }}.

Plan, project context and design:
{{ input_json }}

Respond with a single JSON object with the fields: {{ output_fields | join(\", \") }}.
Each entry of `files` has `path`, `content` and `language`.";

const REVIEWER_TEMPLATE: &str = "\
Task {{ task_id }}: {{ purpose }}.

Code under review:
{{ input_json }}

Respond with a single JSON object with the fields: {{ output_fields | join(\", \") }}.";

const TESTER_TEMPLATE: &str = "\
Task {{ task_id }}: {{ purpose }}.

Input:
{{ input_json }}

Respond with a single JSON object with the fields: {{ output_fields | join(\", \") }}.";

fn default_template(phase: Phase) -> &'static str {
  match phase {
    Phase::Orchestrator => ORCHESTRATOR_TEMPLATE,
    Phase::Architect => ARCHITECT_TEMPLATE,
    Phase::Coder => CODER_TEMPLATE,
    Phase::Reviewer => REVIEWER_TEMPLATE,
    Phase::Tester => TESTER_TEMPLATE,
  }
}

fn system_prompt(phase: Phase) -> &'static str {
  match phase {
    Phase::Orchestrator => {
      "You are the lead engineer of an autonomous software team. You analyze requests and plan the work."
    }
    Phase::Architect => "You are a software architect. You design systems that are simple to build and operate.",
    Phase::Coder => "You are a senior software engineer. You write complete, working code.",
    Phase::Reviewer => "You are a code reviewer focused on quality, performance and security.",
    Phase::Tester => "You are a test engineer. You write and run thorough tests.",
  }
}

#[derive(Serialize)]
struct DirectiveContext<'a> {
  task_id: &'a str,
  phase: &'static str,
  operation: &'static str,
  label: String,
  purpose: &'static str,
  input: &'a serde_json::Value,
  input_json: String,
  output_fields: &'static [&'static str],
}

/// Renders directives from per-phase templates.
#[derive(Debug, Clone, Default)]
pub struct DirectiveBuilder {
  overrides: BTreeMap<Phase, String>,
}

impl DirectiveBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder with template overrides for some phases.
  pub fn with_overrides(overrides: BTreeMap<Phase, String>) -> Self {
    Self { overrides }
  }

  pub fn set_template(&mut self, phase: Phase, template: impl Into<String>) {
    self.overrides.insert(phase, template.into());
  }

  /// The template used for `phase`.
  pub fn template(&self, phase: Phase) -> &str {
    self
      .overrides
      .get(&phase)
      .map(String::as_str)
      .unwrap_or_else(|| default_template(phase))
  }

  /// Render the directive for `request`.
  pub fn build(&self, task_id: &str, request: &PhaseRequest) -> Result<Directive, StepError> {
    let operation = request.operation();
    let phase = operation.phase();
    let spec = table::spec(operation);
    let input = request.to_input();

    let context = DirectiveContext {
      task_id,
      phase: phase.as_str(),
      operation: operation.as_str(),
      label: operation.label(),
      purpose: spec.description,
      input: &input,
      input_json: serde_json::to_string_pretty(&input).unwrap_or_default(),
      output_fields: spec.output,
    };

    let env = Environment::new();
    let prompt = env
      .render_str(self.template(phase), Value::from_serialize(&context))
      .map_err(|e| StepError::Directive {
        phase,
        message: e.to_string(),
      })?;

    Ok(Directive::new(operation, system_prompt(phase), prompt))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use conductor_task::Context;

  fn analyze() -> PhaseRequest {
    PhaseRequest::AnalyzeProject {
      description: "Add a health endpoint".into(),
      context: Context::new("/srv/api"),
    }
  }

  #[test]
  fn default_template_includes_request_and_fields() {
    let directive = DirectiveBuilder::new().build("t-1", &analyze()).unwrap();

    assert_eq!(directive.phase, Phase::Orchestrator);
    assert!(directive.prompt.starts_with("Task t-1: Analyze the request"));
    assert!(directive.prompt.contains("Add a health endpoint"));
    assert!(directive.prompt.contains("\"project\": \"/srv/api\""));
    assert!(directive.prompt.contains("summary, components, risks"));
    assert!(directive.system.contains("lead engineer"));
  }

  #[test]
  fn override_replaces_phase_template() {
    let mut builder = DirectiveBuilder::new();
    builder.set_template(Phase::Orchestrator, "{{ label }} for {{ input.context.project }}");

    let directive = builder.build("t-1", &analyze()).unwrap();
    assert_eq!(directive.prompt, "analyze project for /srv/api");

    // Other phases keep their defaults.
    assert_eq!(builder.template(Phase::Coder), CODER_TEMPLATE);
  }

  #[test]
  fn broken_template_is_a_directive_error() {
    let mut builder = DirectiveBuilder::new();
    builder.set_template(Phase::Orchestrator, "{% if %}");

    let err = builder.build("t-1", &analyze()).unwrap_err();
    assert!(matches!(
      err,
      StepError::Directive {
        phase: Phase::Orchestrator,
        ..
      }
    ));
  }
}
