//! Base names for benchmark resources.
//!
//! Uniqueness per invocation comes from server-side `generateName`; the base
//! only has to be stable per run and valid inside a resource name.

/// Identifier of one sub-benchmark: `<workload-name>/<mime>`.
pub fn run_id(workload_name: &str, mime: &str) -> String {
    format!("{}/{}", workload_name, mime)
}

/// Lower-case `run_id` and replace path separators with `-`.
pub fn base_name(run_id: &str) -> String {
    run_id
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_of_run_id() {
        let id = run_id("clusterrole-lifecycle", "application/json");
        assert_eq!(base_name(&id), "clusterrole-lifecycle-application-json");
    }

    #[test]
    fn test_base_name_lowercases_and_replaces_backslash() {
        assert_eq!(base_name(r"Bench\ConfigMap/CBOR"), "bench-configmap-cbor");
    }

    #[test]
    fn test_base_name_is_deterministic() {
        let id = "configmap-lifecycle/application/vnd.kubernetes.protobuf";
        assert_eq!(base_name(id), base_name(id));
        assert_eq!(
            base_name(id),
            "configmap-lifecycle-application-vnd.kubernetes.protobuf"
        );
    }
}
