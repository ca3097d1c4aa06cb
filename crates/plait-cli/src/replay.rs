//! Script replay: feed requests through `Core::execute` in order.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use plait_core::admission::Route;
use plait_core::domain::{CoreError, ErrorKind, OwnerId};
use plait_core::{Core, Operation, Reply, RequestContext};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One scripted request.
///
/// `op` stays raw until its turn, so one malformed request is reported as a
/// failed step instead of rejecting the whole script.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub client: String,
    #[serde(default)]
    pub route: Route,
    pub owner: OwnerId,
    pub op: serde_json::Value,
}

impl Step {
    fn context(&self) -> RequestContext {
        RequestContext::new(self.client.clone(), self.owner).on_route(self.route)
    }

    fn operation(&self) -> Result<Operation, serde_json::Error> {
        Operation::deserialize(&self.op)
    }
}

/// One output line.
#[derive(Debug, Serialize)]
pub struct Line {
    pub step: usize,
    pub op: &'static str,
    #[serde(flatten)]
    pub result: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok(Reply),
    Error { kind: &'static str, message: String },
}

/// Op name reported for a request that did not parse.
const MALFORMED: &str = "malformed";

impl Outcome {
    fn malformed(err: &serde_json::Error) -> Self {
        Outcome::Error {
            kind: ErrorKind::Validation.as_str(),
            message: err.to_string(),
        }
    }
}

impl From<Result<Reply, CoreError>> for Outcome {
    fn from(result: Result<Reply, CoreError>) -> Self {
        match result {
            Ok(reply) => Outcome::Ok(reply),
            Err(err) => Outcome::Error {
                kind: err.kind().as_str(),
                message: err.to_string(),
            },
        }
    }
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let steps = serde_json::from_str(&text)
        .with_context(|| format!("parsing script {}", path.display()))?;
    Ok(steps)
}

/// Run every step, writing one JSON line each. Returns the number of failed
/// steps.
pub async fn replay(
    core: &Core,
    steps: Vec<Step>,
    fail_fast: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let total = steps.len();
    let mut failed = 0;

    for (index, step) in steps.into_iter().enumerate() {
        let (op_name, result) = match step.operation() {
            Ok(op) => {
                let name = op.name();
                let outcome: Outcome = core.execute(&step.context(), op).await.into();
                (name, outcome)
            }
            Err(err) => {
                warn!(step = index, error = %err, "malformed request");
                (MALFORMED, Outcome::malformed(&err))
            }
        };
        let is_err = matches!(result, Outcome::Error { .. });

        let line = Line {
            step: index,
            op: op_name,
            result,
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;

        if is_err {
            failed += 1;
            if fail_fast {
                break;
            }
        }
    }

    info!(total, failed, "replay finished");
    Ok(failed)
}
