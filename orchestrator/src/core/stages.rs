//! Stage catalog
//!
//! Every algorithm family runs the same driver over a different ordered
//! list of stage descriptors. This module is the only place that knows the
//! external commands and artifact names; the executor just walks the list.

use std::fmt;

use crate::config::DeploymentMode;
use crate::core::plan::JobPlan;
use shared::{AlgorithmFamily, JobId};

/// Log written by the computation runtime in SMPC deployments
pub const SERVER_LOG: &str = "/etc/sharemind/server.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Configure,
    Generate,
    ClearStale,
    Compile,
    Run,
    Extract,
    Respond,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Configure => "configure",
            StageKind::Generate => "generate",
            StageKind::ClearStale => "clear_stale",
            StageKind::Compile => "compile",
            StageKind::Run => "run",
            StageKind::Extract => "extract",
            StageKind::Respond => "respond",
        };
        write!(f, "{name}")
    }
}

/// What a stage does when driven
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    /// Persist the raw request as `configuration_{job}.json`
    WriteConfiguration,
    /// Delete a workdir-relative artifact; absence is fine
    RemoveIfExists(String),
    /// Run a shell command in the workdir
    Shell(String),
}

/// One step of a job's pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStage {
    pub kind: StageKind,
    pub action: StageAction,
    /// Step published to the ledger once this stage completes
    pub completion_status: Option<&'static str>,
}

impl PipelineStage {
    fn new(kind: StageKind, action: StageAction) -> Self {
        Self {
            kind,
            action,
            completion_status: None,
        }
    }

    fn shell(kind: StageKind, command: String) -> Self {
        Self::new(kind, StageAction::Shell(command))
    }

    fn announcing(mut self, status: &'static str) -> Self {
        self.completion_status = Some(status);
        self
    }
}

pub fn configuration_file(job_id: &JobId) -> String {
    format!("configuration_{job_id}.json")
}

/// Quote a value for safe interpolation into a `bash -c` command line
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Build the ordered stage list for a job
pub fn build_stages(plan: &JobPlan, mode: DeploymentMode, job_id: &JobId) -> Vec<PipelineStage> {
    let dir = plan.family.source_dir();
    let config = configuration_file(job_id);
    let output = format!("out_{job_id}.{}", plan.family.output_extension());
    let is_tree = plan.family == AlgorithmFamily::DecisionTree;

    let mut stages = vec![PipelineStage::new(StageKind::Configure, StageAction::WriteConfiguration)];

    let generator = format!("python dataset-scripts/{} {config}", generator_script(plan));
    let generate = match mode {
        DeploymentMode::Simulation => PipelineStage::shell(StageKind::Generate, format!("{generator} --DNS web/localDNS.json"))
            .announcing("SecreC code generated. Now compiling."),
        DeploymentMode::Smpc => {
            let command = match plan.family {
                AlgorithmFamily::Histogram => format!("{generator} --DNS web/MHMDdns_cvi.json"),
                _ => generator,
            };
            PipelineStage::shell(StageKind::Generate, command).announcing("SecreC code generated. Now compiling and running.")
        }
    };
    stages.push(generate);

    stages.push(PipelineStage::new(
        StageKind::ClearStale,
        StageAction::RemoveIfExists(format!("{dir}/.main_{job_id}.sb.src")),
    ));

    // Tree output carries a trailing comma the response scripts reject
    let tidy = if is_tree { r#" | sed --expression="s/,  }/ }/g""# } else { "" };

    match mode {
        DeploymentMode::Simulation => {
            stages.push(
                PipelineStage::shell(StageKind::Compile, format!("sharemind-scripts/compile.sh {dir}/main_{job_id}.sc"))
                    .announcing("SecreC code compiled. Now running."),
            );
            let run = if is_tree {
                format!("set -o pipefail && sharemind-scripts/run.sh {dir}/main_{job_id}.sb 2>&1 >/dev/null{tidy} > {output}")
            } else {
                format!("sharemind-scripts/run.sh {dir}/main_{job_id}.sb 2> {output}")
            };
            stages.push(PipelineStage::shell(StageKind::Run, run).announcing("SecreC code run. Now generating output."));
        }
        DeploymentMode::Smpc => {
            stages.push(
                PipelineStage::shell(
                    StageKind::Compile,
                    format!("sharemind-scripts/sm_compile_and_run.sh {dir}/main_{job_id}.sc"),
                )
                .announcing("SecreC code compiled and run. Now generating output."),
            );
            // The runtime tags each run's lines with a session prefix; find the
            // job's last session and keep only its payload columns
            let extract = format!(
                r#"grep --fixed-strings --text "`grep --text "{job_id}" {SERVER_LOG} | tail -n 1 | cut -d " "  -f "7-8"`" {SERVER_LOG} | cut -d " "  -f "9-"{tidy} > {output}"#
            );
            stages.push(PipelineStage::shell(StageKind::Extract, extract));
        }
    }

    stages.push(PipelineStage::shell(StageKind::Respond, respond_command(plan, &config, &output)));
    stages
}

fn generator_script(plan: &JobPlan) -> String {
    match plan.family {
        AlgorithmFamily::Histogram => "main_generator.py".to_string(),
        AlgorithmFamily::Count => "count_main_generator.py".to_string(),
        AlgorithmFamily::DecisionTree => {
            format!("{}_main_generator.py", plan.classifier.unwrap_or_default().script_prefix())
        }
    }
}

fn respond_command(plan: &JobPlan, config: &str, output: &str) -> String {
    match (plan.family, plan.plot) {
        (AlgorithmFamily::Histogram, false) => format!("python web/response.py {output}"),
        (AlgorithmFamily::Histogram, true) => format!("cd web && python plot.py ../{config}"),
        (AlgorithmFamily::Count, false) => format!(
            "python web/response.py {output} | python web/transform_response.py {config} \
             --mapping mhmd-driver/mesh_mapping.json --mtrees_inverted mhmd-driver/m_inv.json"
        ),
        (AlgorithmFamily::Count, true) => format!("cd web && python count_plot.py ../{output} ../{config}"),
        (AlgorithmFamily::DecisionTree, plot) => {
            let prefix = plan.classifier.unwrap_or_default().script_prefix();
            let flag = if plot { " --plot" } else { "" };
            format!("python web/{prefix}_response.py {output} {config}{flag}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan(family: AlgorithmFamily, body: serde_json::Value) -> JobPlan {
        JobPlan::resolve(family, &body).unwrap()
    }

    fn kinds(stages: &[PipelineStage]) -> Vec<StageKind> {
        stages.iter().map(|s| s.kind).collect()
    }

    fn statuses(stages: &[PipelineStage]) -> Vec<&'static str> {
        stages.iter().filter_map(|s| s.completion_status).collect()
    }

    #[test]
    fn test_simulation_histogram_pipeline() {
        let job = JobId::new();
        let stages = build_stages(&plan(AlgorithmFamily::Histogram, json!({ "attributes": ["age"] })), DeploymentMode::Simulation, &job);

        assert_eq!(
            kinds(&stages),
            vec![StageKind::Configure, StageKind::Generate, StageKind::ClearStale, StageKind::Compile, StageKind::Run, StageKind::Respond]
        );
        assert_eq!(
            statuses(&stages),
            vec![
                "SecreC code generated. Now compiling.",
                "SecreC code compiled. Now running.",
                "SecreC code run. Now generating output."
            ]
        );
        assert_eq!(
            stages[1].action,
            StageAction::Shell(format!("python dataset-scripts/main_generator.py configuration_{job}.json --DNS web/localDNS.json"))
        );
        assert_eq!(stages[2].action, StageAction::RemoveIfExists(format!("histogram/.main_{job}.sb.src")));
        assert_eq!(stages[5].action, StageAction::Shell(format!("python web/response.py out_{job}.txt")));
    }

    #[test]
    fn test_smpc_pipeline_extracts_from_server_log() {
        let job = JobId::new();
        let stages = build_stages(&plan(AlgorithmFamily::Count, json!({ "attributes": ["C01"] })), DeploymentMode::Smpc, &job);

        assert_eq!(
            kinds(&stages),
            vec![StageKind::Configure, StageKind::Generate, StageKind::ClearStale, StageKind::Compile, StageKind::Extract, StageKind::Respond]
        );
        assert_eq!(
            statuses(&stages),
            vec!["SecreC code generated. Now compiling and running.", "SecreC code compiled and run. Now generating output."]
        );
        assert_eq!(
            stages[1].action,
            StageAction::Shell(format!("python dataset-scripts/count_main_generator.py configuration_{job}.json"))
        );
        match &stages[4].action {
            StageAction::Shell(command) => {
                assert!(command.contains(SERVER_LOG));
                assert!(command.ends_with(&format!("> out_{job}.txt")));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_decision_tree_uses_classifier_scripts_and_json_output() {
        let job = JobId::new();
        let body = json!({ "attributes": ["age"], "class_attribute": "outcome", "dataset": "cvi", "classifier": "C45", "plot": true });
        let stages = build_stages(&plan(AlgorithmFamily::DecisionTree, body), DeploymentMode::Simulation, &job);

        assert_eq!(
            stages[1].action,
            StageAction::Shell(format!("python dataset-scripts/c45_main_generator.py configuration_{job}.json --DNS web/localDNS.json"))
        );
        assert_eq!(stages[2].action, StageAction::RemoveIfExists(format!("decision-tree/.main_{job}.sb.src")));
        assert_eq!(
            stages.last().unwrap().action,
            StageAction::Shell(format!("python web/c45_response.py out_{job}.json configuration_{job}.json --plot"))
        );
    }

    #[test]
    fn test_plot_mode_swaps_the_response_stage() {
        let job = JobId::new();
        let stages = build_stages(
            &plan(AlgorithmFamily::Histogram, json!({ "attributes": ["age"], "plot": true })),
            DeploymentMode::Smpc,
            &job,
        );
        assert_eq!(
            stages.last().unwrap().action,
            StageAction::Shell(format!("cd web && python plot.py ../configuration_{job}.json"))
        );
        assert_eq!(
            stages[1].action,
            StageAction::Shell(format!("python dataset-scripts/main_generator.py configuration_{job}.json --DNS web/MHMDdns_cvi.json"))
        );
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("age"), "'age'");
        assert_eq!(shell_quote("o'brien"), r"'o'\''brien'");
    }
}
