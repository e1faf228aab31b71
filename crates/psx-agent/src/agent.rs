use std::sync::Arc;

use psx_model::{FailureReason, FieldSet, Status, StatusReport};
use psx_platform::Platform;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::{
    AgentError, Inputs, Outputs, TaskError, TaskRef, ValidationError, upload::upload,
    validate::validate,
};

pub const MSG_STARTED: &str = "Task execution started.";
pub const MSG_COMPLETED: &str = "Task execution completed.";
pub const MSG_SUCCEEDED: &str = "Task execution succeeded.";

/// Drives one execution instance from value fetch to final status.
///
/// Steps run strictly in sequence:
/// 1. fetch the declared fields;
/// 2. hand the input values to the task;
/// 3. check the returned outputs against the declared output fields;
/// 4. validate and upload each output in the order the task returned it;
/// 5. report SUCCESS.
///
/// Any error along the way is reported as a log line followed by FAILED
/// (`SERVER_ERROR`) and then returned to the caller.
pub struct Agent {
    platform: Arc<dyn Platform>,
    task: TaskRef,
}

impl Agent {
    pub fn new(platform: Arc<dyn Platform>, task: TaskRef) -> Self {
        Self { platform, task }
    }

    /// Execute the task once. Meant to be called exactly once per process.
    #[instrument(skip(self), fields(task = %self.task.name()))]
    pub async fn run(&self) -> Result<(), AgentError> {
        match self.execute().await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.report_failure(&err).await;
                Err(err)
            }
        }
    }

    async fn execute(&self) -> Result<(), AgentError> {
        let values = self.platform.fetch_values().await.map_err(AgentError::Fetch)?;
        debug!(fields = values.len(), "values fetched");

        let inputs = Inputs::from_fields(&values);

        self.log(MSG_STARTED).await?;
        let outputs = self.execute_task(inputs).await?;
        self.log(MSG_COMPLETED).await?;

        check_outputs(&values, &outputs)?;

        for (name, value) in outputs {
            self.send_output(&values, &name, value).await?;
        }

        let success = StatusReport::status(Status::Success)
            .map_err(|e| AgentError::Report(e.into()))?;
        self.platform
            .update_status(&success)
            .await
            .map_err(AgentError::Report)?;
        self.log(MSG_SUCCEEDED).await
    }

    /// Runs the task on its own tokio task so a panic surfaces as [`TaskError::Panicked`].
    async fn execute_task(&self, inputs: Inputs) -> Result<Outputs, TaskError> {
        let task = self.task.clone();
        tokio::spawn(async move { task.execute(inputs).await }).await?
    }

    async fn send_output(
        &self,
        values: &FieldSet,
        name: &str,
        value: Value,
    ) -> Result<(), AgentError> {
        let field = values
            .get(name)
            .ok_or_else(|| ValidationError::UnknownField(name.to_string()))?;
        if !field.is_output() {
            return Err(ValidationError::NotAnOutput(name.to_string()).into());
        }

        validate(field, &value).await?;
        upload(self.platform.as_ref(), field, value)
            .await
            .map_err(|source| AgentError::Upload {
                field: name.to_string(),
                source,
            })
    }

    async fn log(&self, message: &str) -> Result<(), AgentError> {
        self.platform
            .report_log(message)
            .await
            .map_err(AgentError::Report)
    }

    /// Best effort: errors here are logged and dropped so the primary error survives.
    async fn report_failure(&self, err: &AgentError) {
        error!(error = %err, "task execution failed");

        let message = format!("Task execution failed: {err}");
        if let Err(e) = self.platform.report_log(&message).await {
            error!(error = %e, "failed to report failure log");
        }

        let failed = StatusReport::failed(FailureReason::ServerError);
        if let Err(e) = self.platform.update_status(&failed).await {
            error!(error = %e, "failed to report FAILED status");
        }
    }
}

/// Every returned name must be a declared output, and every required output must be present.
fn check_outputs(values: &FieldSet, outputs: &Outputs) -> Result<(), ValidationError> {
    for name in outputs.names() {
        let declared = values.get(name).is_some_and(|f| f.is_output());
        if !declared {
            let mut names: Vec<_> = values.outputs().map(|f| f.name.as_str()).collect();
            names.sort_unstable();
            return Err(ValidationError::UnknownOutput {
                field: name.to_string(),
                declared: names.join(", "),
            });
        }
    }

    let mut missing: Vec<String> = values
        .required_outputs()
        .filter(|name| !outputs.contains(name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(ValidationError::MissingOutputs(missing));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};

    use psx_model::{FieldSpec, FieldType, SchemaError};
    use psx_platform::PlatformError;
    use serde_json::json;

    use crate::TaskFn;
    use crate::testing::{Recorded, RecordingPlatform};

    fn greeting_fields() -> FieldSet {
        FieldSet::try_from(vec![
            FieldSpec::input("name", FieldType::String).with_value("Alice"),
            FieldSpec::output("greeting", FieldType::String),
        ])
        .unwrap()
    }

    fn greeter() -> TaskRef {
        TaskFn::arc("greeter", |inputs: Inputs| async move {
            let name = inputs.require_string("name")?.to_string();
            Ok(Outputs::new().with("greeting", format!("Hello {name}")))
        })
    }

    fn returning(outputs: Outputs) -> TaskRef {
        TaskFn::arc("fixed", move |_inputs: Inputs| {
            let outputs = outputs.clone();
            async move { Ok(outputs) }
        })
    }

    fn failed() -> Recorded {
        Recorded::Status(Status::Failed, Some(FailureReason::ServerError))
    }

    #[tokio::test]
    async fn greeting_scenario_uploads_and_succeeds() {
        let platform = Arc::new(RecordingPlatform::with_values(greeting_fields()));
        let agent = Agent::new(platform.clone(), greeter());

        agent.run().await.unwrap();

        assert_eq!(
            platform.calls(),
            vec![
                Recorded::Log(MSG_STARTED.into()),
                Recorded::Log(MSG_COMPLETED.into()),
                Recorded::Upload {
                    field: "greeting".into(),
                    body: json!({"string": "Hello Alice"}),
                },
                Recorded::Status(Status::Success, None),
                Recorded::Log(MSG_SUCCEEDED.into()),
            ]
        );
    }

    #[tokio::test]
    async fn task_error_reports_failure_without_uploads() {
        let platform = Arc::new(RecordingPlatform::with_values(greeting_fields()));
        let task = TaskFn::arc("broken", |_inputs: Inputs| async move {
            Err::<Outputs, _>(TaskError::fail("model weights missing"))
        });

        let err = Agent::new(platform.clone(), task).run().await.unwrap_err();
        assert!(matches!(err, AgentError::Task(_)));

        assert_eq!(
            platform.calls(),
            vec![
                Recorded::Log(MSG_STARTED.into()),
                Recorded::Log("Task execution failed: model weights missing".into()),
                failed(),
            ]
        );
        assert_eq!(platform.uploads(), 0);
    }

    #[tokio::test]
    async fn panicking_task_is_reported_as_failed() {
        let platform = Arc::new(RecordingPlatform::with_values(greeting_fields()));
        let task = TaskFn::arc("panicky", |_inputs: Inputs| async move {
            let empty: Vec<Outputs> = Vec::new();
            Ok(empty[0].clone())
        });

        let err = Agent::new(platform.clone(), task).run().await.unwrap_err();
        assert!(matches!(err, AgentError::Task(TaskError::Panicked(_))));

        let calls = platform.calls();
        assert_eq!(calls.first(), Some(&Recorded::Log(MSG_STARTED.into())));
        assert!(matches!(
            &calls[1],
            Recorded::Log(l) if l.starts_with("Task execution failed: task panicked:")
        ));
        assert_eq!(calls.last(), Some(&failed()));
        assert_eq!(calls.len(), 3);
    }

    #[tokio::test]
    async fn task_sees_only_inputs_including_null_values() {
        let fields = FieldSet::try_from(vec![
            FieldSpec::input("a", FieldType::Number).with_value(2i64),
            FieldSpec::input("b", FieldType::String),
            FieldSpec::output("out", FieldType::Number).with_default(0i64),
        ])
        .unwrap();
        let platform = Arc::new(RecordingPlatform::with_values(fields));
        let seen = Arc::new(AtomicBool::new(false));

        let flag = seen.clone();
        let task = TaskFn::arc("inspect", move |inputs: Inputs| {
            let flag = flag.clone();
            async move {
                assert_eq!(inputs.len(), 2);
                assert_eq!(inputs.number("a"), Some(2.0));
                assert!(inputs.contains("b") && inputs.get("b").is_none());
                assert!(!inputs.contains("out"));
                flag.store(true, Ordering::SeqCst);
                Ok(Outputs::new())
            }
        });

        Agent::new(platform.clone(), task).run().await.unwrap();
        assert!(seen.load(Ordering::SeqCst));
        assert_eq!(platform.uploads(), 0);
    }

    #[tokio::test]
    async fn unknown_output_fails_before_any_upload() {
        let platform = Arc::new(RecordingPlatform::with_values(greeting_fields()));
        let outputs = Outputs::new()
            .with("greeting", "hi")
            .with("name", "not an output")
            .with("extra", 1);

        let err = Agent::new(platform.clone(), returning(outputs))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AgentError::Validation(ValidationError::UnknownOutput { ref field, ref declared })
                if field == "name" && declared == "greeting"
        ));
        assert_eq!(platform.uploads(), 0);
        assert_eq!(platform.calls().last(), Some(&failed()));
    }

    #[tokio::test]
    async fn missing_required_output_is_listed() {
        let fields = FieldSet::try_from(vec![
            FieldSpec::output("b_required", FieldType::String),
            FieldSpec::output("a_required", FieldType::Boolean),
            FieldSpec::output("optional", FieldType::Number).with_default(1i64),
        ])
        .unwrap();
        let platform = Arc::new(RecordingPlatform::with_values(fields));

        let err = Agent::new(platform.clone(), returning(Outputs::new()))
            .run()
            .await
            .unwrap_err();

        match err {
            AgentError::Validation(ValidationError::MissingOutputs(names)) => {
                assert_eq!(names, vec!["a_required", "b_required"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(platform.uploads(), 0);
    }

    #[tokio::test]
    async fn optional_outputs_may_be_omitted() {
        let fields = FieldSet::try_from(vec![
            FieldSpec::output("required", FieldType::Boolean),
            FieldSpec::output("optional", FieldType::Number).with_default(1i64),
        ])
        .unwrap();
        let platform = Arc::new(RecordingPlatform::with_values(fields));

        Agent::new(platform.clone(), returning(Outputs::new().with("required", true)))
            .run()
            .await
            .unwrap();

        assert_eq!(platform.uploads(), 1);
    }

    #[tokio::test]
    async fn outputs_upload_in_returned_order_and_stop_at_first_bad_value() {
        let fields = FieldSet::try_from(vec![
            FieldSpec::output("first", FieldType::Number),
            FieldSpec::output("second", FieldType::String),
            FieldSpec::output("third", FieldType::Boolean),
        ])
        .unwrap();
        let platform = Arc::new(RecordingPlatform::with_values(fields));
        let outputs = Outputs::new()
            .with("third", true)
            .with("second", 5)
            .with("first", 1);

        let err = Agent::new(platform.clone(), returning(outputs))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AgentError::Validation(ValidationError::TypeMismatch { ref field, .. })
                if field == "second"
        ));
        let uploads: Vec<_> = platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::Upload { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, vec!["third"]);
    }

    #[tokio::test]
    async fn file_outputs_pick_multipart_or_url() {
        let fields = FieldSet::try_from(vec![
            FieldSpec::output("local", FieldType::File),
            FieldSpec::output("remote", FieldType::File),
        ])
        .unwrap();
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"data").unwrap();
        let local = tmp.path().to_str().unwrap().to_string();
        let expected_name = tmp
            .path()
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let platform = Arc::new(RecordingPlatform::with_values(fields));
        let outputs = Outputs::new()
            .with("local", local)
            .with("remote", "https://cdn.example.com/r.bin");
        Agent::new(platform.clone(), returning(outputs))
            .run()
            .await
            .unwrap();

        let calls = platform.calls();
        assert_eq!(
            calls[2],
            Recorded::UploadFile {
                field: "local".into(),
                filename: expected_name,
                bytes: b"data".to_vec(),
            }
        );
        assert_eq!(
            calls[3],
            Recorded::Upload {
                field: "remote".into(),
                body: json!({"file_url": "https://cdn.example.com/r.bin"}),
            }
        );
    }

    #[tokio::test]
    async fn invalid_file_reference_fails_before_upload() {
        let fields = FieldSet::try_from(vec![FieldSpec::output("f", FieldType::File)]).unwrap();
        let platform = Arc::new(RecordingPlatform::with_values(fields));

        let err = Agent::new(
            platform.clone(),
            returning(Outputs::new().with("f", "definitely/not/here.bin")),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AgentError::Validation(ValidationError::FileNotFound { .. })
        ));
        assert_eq!(platform.uploads(), 0);
    }

    #[tokio::test]
    async fn directory_as_file_output_fails_before_upload() {
        let fields = FieldSet::try_from(vec![FieldSpec::output("f", FieldType::File)]).unwrap();
        let platform = Arc::new(RecordingPlatform::with_values(fields));
        let dir = tempfile::tempdir().unwrap();

        let err = Agent::new(
            platform.clone(),
            returning(Outputs::new().with("f", dir.path().to_str().unwrap())),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AgentError::Validation(ValidationError::FileUnreadable { .. })
        ));
        assert_eq!(platform.uploads(), 0);
        assert_eq!(platform.calls().last(), Some(&failed()));
    }

    #[tokio::test]
    async fn schema_error_on_fetch_is_reported() {
        let platform = Arc::new(RecordingPlatform {
            values: Err(SchemaError::TooMany(51)),
            ..Default::default()
        });

        let err = Agent::new(platform.clone(), greeter()).run().await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Fetch(PlatformError::Schema(SchemaError::TooMany(51)))
        ));
        assert_eq!(platform.calls().last(), Some(&failed()));
        assert!(platform.logs()[0].starts_with("Task execution failed: failed to fetch values"));
    }

    #[tokio::test]
    async fn upload_failure_is_reported_as_failed() {
        let platform = Arc::new(RecordingPlatform {
            fail_uploads: true,
            ..RecordingPlatform::with_values(greeting_fields())
        });

        let err = Agent::new(platform.clone(), greeter()).run().await.unwrap_err();
        assert!(matches!(err, AgentError::Upload { ref field, .. } if field == "greeting"));
        assert_eq!(platform.calls().last(), Some(&failed()));
    }

    #[tokio::test]
    async fn failing_reports_do_not_mask_the_primary_error() {
        let platform = Arc::new(RecordingPlatform {
            fail_reports: true,
            ..RecordingPlatform::with_values(greeting_fields())
        });

        let err = Agent::new(platform.clone(), greeter()).run().await.unwrap_err();
        assert!(matches!(err, AgentError::Report(_)));
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn check_outputs_accepts_exact_match() {
        let values = greeting_fields();
        let outputs = Outputs::new().with("greeting", "hi");
        assert!(check_outputs(&values, &outputs).is_ok());
    }
}
