// SPDX-License-Identifier: MIT OR Apache-2.0
//! The run's action/check execution loop.

use crate::error::EngineError;
use crate::procedure::Procedure;
use crate::runtime::ClientRuntime;
use cactus_actions::{ActionContext, ActionResult};
use cactus_checks::CheckContext;
use cactus_config::{GlobalConfig, RunConfig};
use cactus_protocol::RequestContext;
use cactus_scheduler::StepQueue;
use cactus_track::{evaluate, EvaluationOutcome, ProgressTracker, ResponseTracker, StepExecutionCompletion, StepResult, WarningSource, WarningTracker};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;

/// Fixed delay inserted between `repeat-until-pass` retries, to avoid a
/// tight spin against a server that is still converging.
pub const REPEAT_DELAY: std::time::Duration = std::time::Duration::from_secs(2);

/// Owns every client runtime participating in a run plus the run's
/// scheduler and trackers, and drives the step queue to completion.
pub struct Engine {
    runtimes: BTreeMap<String, ClientRuntime>,
    device_capability_uri: String,
    server_pen: u32,
    queue: StepQueue,
    progress: ProgressTracker,
    warnings: WarningTracker,
    responses: Arc<ResponseTracker>,
    procedure_step_ids: Vec<String>,
}

impl Engine {
    /// Assemble a run: build every named client's runtime (wiring a shared
    /// [`ResponseTracker`] in as every request's observer) and load the
    /// procedure's steps into the scheduler in document order.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownClientAlias`] if `run.client_aliases` names a
    /// client absent from `global`; [`EngineError::Request`] if any named
    /// client's TLS identity fails to build.
    pub fn build(global: &GlobalConfig, run: &RunConfig, procedure: Procedure) -> Result<Self, EngineError> {
        let responses = Arc::new(ResponseTracker::new());
        let mut runtimes = BTreeMap::new();
        for alias in &run.client_aliases {
            let runtime = ClientRuntime::build(global, alias, responses.clone())?;
            runtimes.insert(alias.clone(), runtime);
        }

        let mut queue = StepQueue::new();
        for (index, procedure_step) in procedure.steps.iter().enumerate() {
            let mut execution = cactus_model::StepExecution::first(procedure_step.step.clone(), procedure_step.owning_client_alias.clone(), index as i64);
            if let Some(resource_owner) = &procedure_step.resource_owning_client_alias {
                execution.resource_owning_client_alias = resource_owner.clone();
            }
            queue.add(execution);
        }

        Ok(Self {
            runtimes,
            device_capability_uri: global.server.device_capability_uri.clone(),
            server_pen: global.server.server_pen,
            queue,
            progress: ProgressTracker::new(),
            warnings: WarningTracker::new(),
            responses,
            procedure_step_ids: procedure.step_ids(),
        })
    }

    /// Drain the queue to completion (or to the first unrecoverable
    /// failure), tear down every client's notification endpoints
    /// (`safely-delete-all` must run even on early/cancelled exit), sweep
    /// every client's finished store once for resource-level validation
    /// findings, and evaluate the result.
    ///
    /// Returns the evaluation outcome alongside the shared response
    /// tracker, so a caller (e.g. `cactus-cli`) can render the request/
    /// response log without the engine owning any reporting concerns.
    pub async fn run(mut self) -> (EvaluationOutcome, Arc<ResponseTracker>) {
        let run_completed = self.drain().await;
        for runtime in self.runtimes.values_mut() {
            runtime.notifications.safely_delete_all().await;
        }
        crate::validation::validate_stores(&self.runtimes, self.server_pen, &mut self.warnings);
        let outcome = evaluate(run_completed, &self.procedure_step_ids, &self.progress, &self.warnings, &self.responses);
        (outcome, self.responses)
    }

    /// Runs the loop; returns `true` iff every step in the procedure was
    /// attempted to a final result (i.e. no uncaught failure stopped the
    /// run early).
    async fn drain(&mut self) -> bool {
        loop {
            let now = SystemTime::now();
            if self.queue.peek_next_no_wait(now).is_none() {
                return true;
            }
            let delay = self.queue.delay_until_next(now);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
                continue;
            }
            let Some(execution) = self.queue.pop(SystemTime::now()) else {
                return true;
            };

            match self.execute_one(execution).await {
                StepOutcome::ContinueRunning => {}
                StepOutcome::StopRun => return false,
            }
        }
    }

    async fn execute_one(&mut self, execution: cactus_model::StepExecution) -> StepOutcome {
        let step_id = execution.step.id.clone();
        let repeat_number = execution.repeat_number;
        let attempts = execution.attempts;
        let now = SystemTime::now();

        let Some(runtime) = self.runtimes.get_mut(&execution.resource_owning_client_alias) else {
            self.warnings.record(
                WarningSource::StepExecution { step_id: step_id.clone(), repeat_number },
                format!("resource-owning client alias {:?} is not part of this run", execution.resource_owning_client_alias),
            );
            self.progress.record_result(&step_id, StepResult { passed: false, description: Some("resource-owning client alias not part of this run".to_string()) });
            return StepOutcome::StopRun;
        };

        let request_ctx = RequestContext { client_alias: execution.owning_client_alias.clone(), step_id: step_id.clone() };

        let action_result = {
            let mut action_ctx = ActionContext {
                client: &runtime.client,
                device_capability_uri: &self.device_capability_uri,
                request_ctx: &request_ctx,
                client_config: &runtime.config,
                store: &mut runtime.store,
                notifications: &mut runtime.notifications,
                now,
                repeat_number,
            };
            match cactus_actions::run_action(&execution.step.action, &step_id, &mut action_ctx).await {
                Ok(result) => result,
                Err(error) => {
                    self.progress.log(&step_id, format!("action {:?} raised: {error}", execution.step.action.type_name));
                    ActionResult::failed(error.to_string())
                }
            }
        };

        if !action_result.completed {
            self.progress.record_completion(&step_id, StepExecutionCompletion { repeat_number, attempts, passed: false, description: action_result.description.clone() });
            self.progress.record_result(&step_id, StepResult { passed: false, description: action_result.description });
            return StepOutcome::StopRun;
        }

        let (checks_passed, check_description) = {
            let check_ctx = CheckContext { client_config: &runtime.config, store: &runtime.store };
            let mut passed = true;
            let mut descriptions = Vec::new();
            for check in &execution.step.checks {
                match cactus_checks::run_check(check, &step_id, &check_ctx) {
                    Ok(result) => {
                        if !result.passed {
                            passed = false;
                        }
                        if let Some(description) = result.description {
                            descriptions.push(description);
                        }
                    }
                    Err(error) => {
                        passed = false;
                        descriptions.push(error.to_string());
                    }
                }
            }
            (passed, descriptions)
        };

        let description = if check_description.is_empty() { action_result.description.clone() } else { Some(check_description.join("; ")) };
        self.progress.record_completion(&step_id, StepExecutionCompletion { repeat_number, attempts, passed: checks_passed, description: description.clone() });

        if checks_passed {
            if action_result.repeat {
                let mut next = execution;
                next.repeat_number += 1;
                next.attempts = 0;
                next.not_before = action_result.not_before;
                self.queue.add(next);
            } else {
                self.progress.record_result(&step_id, StepResult { passed: true, description });
            }
            StepOutcome::ContinueRunning
        } else if execution.step.repeat_until_pass {
            let mut next = execution;
            next.attempts += 1;
            next.not_before = None;
            self.queue.add(next);
            tokio::time::sleep(REPEAT_DELAY).await;
            StepOutcome::ContinueRunning
        } else {
            self.progress.record_result(&step_id, StepResult { passed: false, description });
            StepOutcome::StopRun
        }
    }
}

enum StepOutcome {
    ContinueRunning,
    StopRun,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::{ClientConfig, Invocation, ParamMap, Role, ServerConfig, Step};
    use std::time::Duration;

    fn server_config(uri: String) -> ServerConfig {
        ServerConfig {
            device_capability_uri: format!("{uri}/dcap"),
            verify_hostname: false,
            trust_anchor_path: None,
            notification_collector_uri: format!("{uri}/collector"),
            server_pen: 1,
            refetch_delay: Duration::from_millis(10),
        }
    }

    fn client_config(id: &str, dir: &tempfile::TempDir) -> ClientConfig {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert = dir.path().join(format!("{id}-cert.pem"));
        let key = dir.path().join(format!("{id}-key.pem"));
        std::fs::write(&cert, certified.cert.pem()).unwrap();
        std::fs::write(&key, certified.key_pair.serialize_pem()).unwrap();
        ClientConfig { id: id.to_string(), role: Role::Device, cert_path: cert, key_path: key, lfdi: "AB".repeat(20), pen: 1, pin: 1234, nominal_max_watts: 5000, user_agent: None }
    }

    fn no_op_step(id: &str) -> Step {
        Step { id: id.to_string(), action: Invocation { type_name: "no-op".to_string(), params: ParamMap::new() }, checks: Vec::new(), repeat_until_pass: false }
    }

    #[tokio::test]
    async fn a_single_no_op_step_runs_to_a_passing_result() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig { clients: vec![client_config("client-1", &dir)], server: server_config("https://example.test".to_string()) };
        let run = RunConfig { test_procedure_id: "p1".to_string(), client_aliases: vec!["client-1".to_string()], protocol_minor_version: "1.3".to_string(), headless: true };
        let procedure = Procedure {
            id: "p1".to_string(),
            steps: vec![crate::procedure::ProcedureStep { step: no_op_step("s1"), owning_client_alias: "client-1".to_string(), resource_owning_client_alias: None }],
        };

        let engine = Engine::build(&global, &run, procedure).unwrap();
        let (outcome, _responses) = engine.run().await;
        assert!(outcome.passed, "{:?}", outcome.reasons);
    }

    #[tokio::test]
    async fn an_unknown_client_alias_in_run_config_fails_to_build() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig { clients: vec![client_config("client-1", &dir)], server: server_config("https://example.test".to_string()) };
        let run = RunConfig { test_procedure_id: "p1".to_string(), client_aliases: vec!["not-a-client".to_string()], protocol_minor_version: "1.3".to_string(), headless: true };
        let procedure = Procedure::default();

        let err = Engine::build(&global, &run, procedure).unwrap_err();
        assert!(matches!(err, EngineError::UnknownClientAlias { .. }));
    }

    /// Scheduler repeat + primacy: step 1 repeats once after a fixed
    /// delay, step 2 is immediate. Expected order is 1 (asks repeat),
    /// 2 (done), 1 (repeat, done); total duration is at least the delay;
    /// every step passes. The delay is scaled down to 1s (`wait`'s
    /// `duration` parameter is whole seconds, so that's the floor) to
    /// keep the test suite fast.
    #[tokio::test]
    async fn e1_scheduler_repeat_and_primacy() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig { clients: vec![client_config("client-1", &dir)], server: server_config("https://example.test".to_string()) };
        let run = RunConfig { test_procedure_id: "p1".to_string(), client_aliases: vec!["client-1".to_string()], protocol_minor_version: "1.3".to_string(), headless: true };

        let mut wait_params = ParamMap::new();
        wait_params.insert("duration".to_string(), cactus_model::ParamValue::Int(1));
        let step1 = Step { id: "1".to_string(), action: Invocation { type_name: "wait".to_string(), params: wait_params }, checks: Vec::new(), repeat_until_pass: false };
        let step2 = no_op_step("2");

        let procedure = Procedure {
            id: "p1".to_string(),
            steps: vec![
                crate::procedure::ProcedureStep { step: step1, owning_client_alias: "client-1".to_string(), resource_owning_client_alias: None },
                crate::procedure::ProcedureStep { step: step2, owning_client_alias: "client-1".to_string(), resource_owning_client_alias: None },
            ],
        };

        let engine = Engine::build(&global, &run, procedure).unwrap();
        let started = std::time::Instant::now();
        let (outcome, _responses) = engine.run().await;
        let elapsed = started.elapsed();

        assert!(outcome.passed, "{:?}", outcome.reasons);
        assert!(elapsed >= Duration::from_secs(1), "expected the run to take at least the wait's delay, took {elapsed:?}");
    }

    /// Action failure without repeat-until-pass: step 1 passes, step 2's
    /// action raises once (a missing required parameter stands in for an
    /// arbitrary action failure — both reach the engine as an uncaught
    /// `ActionError` from `run_action`), step 3 must never run.
    #[tokio::test]
    async fn e2_action_failure_stops_the_run_before_the_next_step() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig { clients: vec![client_config("client-1", &dir)], server: server_config("https://example.test".to_string()) };
        let run = RunConfig { test_procedure_id: "p1".to_string(), client_aliases: vec!["client-1".to_string()], protocol_minor_version: "1.3".to_string(), headless: true };

        let step1 = no_op_step("1");
        let failing_step = Step { id: "2".to_string(), action: Invocation { type_name: "wait".to_string(), params: ParamMap::new() }, checks: Vec::new(), repeat_until_pass: false };
        let step3 = no_op_step("3");

        let procedure = Procedure {
            id: "p1".to_string(),
            steps: vec![
                crate::procedure::ProcedureStep { step: step1, owning_client_alias: "client-1".to_string(), resource_owning_client_alias: None },
                crate::procedure::ProcedureStep { step: failing_step, owning_client_alias: "client-1".to_string(), resource_owning_client_alias: None },
                crate::procedure::ProcedureStep { step: step3, owning_client_alias: "client-1".to_string(), resource_owning_client_alias: None },
            ],
        };

        let engine = Engine::build(&global, &run, procedure).unwrap();
        let (outcome, _responses) = engine.run().await;

        assert!(!outcome.passed);
        assert!(outcome.reasons.iter().any(|r| r.contains("did not complete")));
        assert!(outcome.reasons.iter().any(|r| r.contains("step 2") && r.contains("did not pass")));
        assert!(outcome.reasons.iter().any(|r| r.contains("step 3") && r.contains("no final result recorded")));
    }

    #[tokio::test]
    async fn a_bad_parameter_in_an_action_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig { clients: vec![client_config("client-1", &dir)], server: server_config("https://example.test".to_string()) };
        let run = RunConfig { test_procedure_id: "p1".to_string(), client_aliases: vec!["client-1".to_string()], protocol_minor_version: "1.3".to_string(), headless: true };
        let bad_step = Step { id: "s1".to_string(), action: Invocation { type_name: "wait".to_string(), params: ParamMap::new() }, checks: Vec::new(), repeat_until_pass: false };
        let procedure = Procedure {
            id: "p1".to_string(),
            steps: vec![crate::procedure::ProcedureStep { step: bad_step, owning_client_alias: "client-1".to_string(), resource_owning_client_alias: None }],
        };

        let engine = Engine::build(&global, &run, procedure).unwrap();
        let (outcome, _responses) = engine.run().await;
        assert!(!outcome.passed);
    }
}
