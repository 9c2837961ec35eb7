//! End-to-end coverage for the concrete scenarios enumerated in the
//! project's testable-properties section: small tempdir TypeScript fixtures
//! driven through the real `analyze` pipeline.

use std::fs;

use cg_config::{AnalysisOptions, EntryPointRef, ProjectContext};
use cg_graph::{EdgeKind, NodeKind};
use tempfile::TempDir;

fn project_with(file_name: &str, source: &str) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join(file_name), source).expect("write fixture");
    dir
}

#[test]
fn linear_chain_produces_two_nodes_one_sync_edge() {
    let project = project_with(
        "main.ts",
        r#"
function main() {
    return helper();
}

function helper(): string {
    return "done";
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("main.ts#main").unwrap();
    let graph = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].kind, EdgeKind::Sync);
    assert!(graph.nodes.iter().any(|n| n.name == "main"));
    assert!(graph.nodes.iter().any(|n| n.name == "helper"));
}

#[test]
fn awaited_async_call_produces_async_edge() {
    let project = project_with(
        "main.ts",
        r#"
async function main() {
    return await asyncHelper();
}

async function asyncHelper(): Promise<string> {
    return "done";
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("main.ts#main").unwrap();
    let graph = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert!(graph.nodes.iter().all(|n| n.is_async));
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].kind, EdgeKind::Async);
}

#[test]
fn construction_expression_produces_a_constructor_edge() {
    let project = project_with(
        "main.ts",
        r#"
function main() {
    return new Widget();
}

class Widget {
    constructor() {}
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("main.ts#main").unwrap();
    let graph = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].kind, EdgeKind::Constructor);
    assert!(graph.nodes.iter().any(|n| n.kind == NodeKind::Constructor && n.owning_class.as_deref() == Some("Widget")));
}

#[test]
fn instance_method_call_resolves_this_member_access() {
    let project = project_with(
        "svc.ts",
        r#"
class Svc {
    process() {
        return this.validate();
    }

    validate(): boolean {
        return true;
    }
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("svc.ts#Svc.process").unwrap();
    let graph = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert!(graph.nodes.iter().all(|n| n.owning_class.as_deref() == Some("Svc")));
    assert!(graph.nodes.iter().any(|n| n.id.as_str().ends_with("Svc::process")));
    assert!(graph.nodes.iter().any(|n| n.id.as_str().ends_with("Svc::validate")));
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].kind, EdgeKind::Sync);
}

#[test]
fn three_node_cycle_terminates_without_revisiting() {
    let project = project_with(
        "cycle.ts",
        r#"
function funcA() {
    return funcB();
}

function funcB() {
    return funcC();
}

function funcC() {
    return funcA();
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("cycle.ts#funcA").unwrap();
    let graph = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();

    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 3);
    let names: Vec<_> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
    assert!(names.contains(&"funcA"));
    assert!(names.contains(&"funcB"));
    assert!(names.contains(&"funcC"));
}

#[test]
fn depth_cap_stops_traversal_at_the_configured_bound() {
    let project = project_with(
        "chain.ts",
        r#"
function level1() {
    return level2();
}

function level2() {
    return level3();
}

function level3() {
    return level4();
}

function level4() {
    return level5();
}

function level5(): number {
    return 5;
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("chain.ts#level1").unwrap();
    let mut options = AnalysisOptions::default();
    options.max_depth = 2;
    let graph = cg_engine::analyze(&ctx, &entry, &options).unwrap();

    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 2);
    assert!(graph.nodes.iter().any(|n| n.name == "level1"));
    assert!(graph.nodes.iter().any(|n| n.name == "level2"));
    assert!(graph.nodes.iter().any(|n| n.name == "level3"));
    assert!(!graph.nodes.iter().any(|n| n.name == "level4"));
}

#[test]
fn max_depth_one_includes_only_direct_callees() {
    let project = project_with(
        "chain.ts",
        r#"
function level1() {
    return level2();
}

function level2() {
    return level3();
}

function level3(): number {
    return 3;
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("chain.ts#level1").unwrap();
    let mut options = AnalysisOptions::default();
    options.max_depth = 1;
    let graph = cg_engine::analyze(&ctx, &entry, &options).unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert!(graph.nodes.iter().any(|n| n.name == "level1"));
    assert!(graph.nodes.iter().any(|n| n.name == "level2"));
    assert!(!graph.nodes.iter().any(|n| n.name == "level3"));
}

#[test]
fn callback_analysis_is_gated_by_the_analyze_callbacks_option() {
    let project = project_with(
        "cb.ts",
        r#"
function main() {
    return [1, 2, 3].map(x => x * 2);
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("cb.ts#main").unwrap();

    let mut enabled = AnalysisOptions::default();
    enabled.analyze_callbacks = true;
    let graph = cg_engine::analyze(&ctx, &entry, &enabled).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].kind, EdgeKind::Callback);

    let mut disabled = AnalysisOptions::default();
    disabled.analyze_callbacks = false;
    let graph = cg_engine::analyze(&ctx, &entry, &disabled).unwrap();
    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.edges.len(), 0);
    assert_eq!(graph.nodes[0].kind, NodeKind::Function);
}

#[test]
fn unresolved_callee_produces_no_edge_and_no_fabricated_node() {
    let project = project_with(
        "unresolved.ts",
        r#"
function main() {
    return externalLibraryCall();
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("unresolved.ts#main").unwrap();
    let graph = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();

    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.edges.len(), 0);
}

#[test]
fn max_depth_zero_yields_only_the_entry_node() {
    let project = project_with(
        "main.ts",
        r#"
function main() {
    return helper();
}

function helper(): string {
    return "done";
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("main.ts#main").unwrap();
    let mut options = AnalysisOptions::default();
    options.max_depth = 0;
    let graph = cg_engine::analyze(&ctx, &entry, &options).unwrap();

    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.edges.len(), 0);
    assert_eq!(graph.nodes[0].name, "main");
}

#[test]
fn self_recursive_function_yields_one_node_and_a_self_loop_edge() {
    let project = project_with(
        "recurse.ts",
        r#"
function countdown(n: number) {
    return countdown(n - 1);
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("recurse.ts#countdown").unwrap();
    let graph = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();

    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].source, graph.edges[0].target);
}

#[test]
fn test_file_callee_is_filtered_out_unless_include_test_files_is_set() {
    let dir = TempDir::new().expect("temp dir");
    fs::create_dir_all(dir.path().join("__tests__")).expect("mkdir");
    fs::write(
        dir.path().join("main.ts"),
        r#"
import { testHelper } from './__tests__/helper';

function main() {
    return testHelper();
}
"#,
    )
    .expect("write main");
    fs::write(
        dir.path().join("__tests__/helper.ts"),
        r#"
export function testHelper(): number {
    return 1;
}
"#,
    )
    .expect("write helper");

    let ctx = ProjectContext::new(dir.path());
    let entry = EntryPointRef::parse("main.ts#main").unwrap();

    let excluded = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();
    assert_eq!(excluded.nodes.len(), 1);
    assert_eq!(excluded.edges.len(), 0);

    let mut included_options = AnalysisOptions::default();
    included_options.include_test_files = true;
    let included = cg_engine::analyze(&ctx, &entry, &included_options).unwrap();
    assert_eq!(included.nodes.len(), 2);
    assert_eq!(included.edges.len(), 1);
}

#[test]
fn whole_project_mode_discovers_every_declaration_without_an_entry_point() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("a.ts"),
        r#"
export function alpha() {
    return beta();
}
"#,
    )
    .expect("write a.ts");
    fs::write(
        dir.path().join("b.ts"),
        r#"
export function beta(): number {
    return 1;
}

function unreachableFromAlpha(): number {
    return 2;
}
"#,
    )
    .expect("write b.ts");

    let ctx = ProjectContext::new(dir.path());
    let graph = cg_engine::analyze_whole_project(
        &ctx,
        &AnalysisOptions::default(),
        &cg_engine::ParallelOptions::default(),
    )
    .unwrap();

    let names: Vec<_> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
    assert!(names.contains(&"alpha"));
    assert!(names.contains(&"beta"));
    assert!(names.contains(&"unreachableFromAlpha"));
    assert!(graph.edges.iter().any(|e| e.kind == EdgeKind::Sync));
    assert!(!graph.metadata.approximate);
}

#[test]
fn whole_project_mode_excludes_dependency_directory_files_by_default() {
    let dir = TempDir::new().expect("temp dir");
    fs::create_dir_all(dir.path().join("node_modules/dep")).expect("mkdir");
    fs::write(
        dir.path().join("main.ts"),
        r#"
function main(): number {
    return 1;
}
"#,
    )
    .expect("write main.ts");
    fs::write(
        dir.path().join("node_modules/dep/index.ts"),
        r#"
export function depFunc(): number {
    return 2;
}
"#,
    )
    .expect("write dependency file");

    let ctx = ProjectContext::new(dir.path());
    let graph = cg_engine::analyze_whole_project(
        &ctx,
        &AnalysisOptions::default(),
        &cg_engine::ParallelOptions::default(),
    )
    .unwrap();

    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].name, "main");
    assert!(!graph.nodes.iter().any(|n| n.name == "depFunc"));
}

#[test]
fn reanalyzing_unchanged_source_yields_the_same_node_and_edge_sets() {
    let project = project_with(
        "main.ts",
        r#"
function main() {
    return helper();
}

function helper(): string {
    return "done";
}
"#,
    );
    let ctx = ProjectContext::new(project.path());
    let entry = EntryPointRef::parse("main.ts#main").unwrap();

    let first = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();
    let second = cg_engine::analyze(&ctx, &entry, &AnalysisOptions::default()).unwrap();

    let mut first_names: Vec<_> = first.nodes.iter().map(|n| n.name.clone()).collect();
    let mut second_names: Vec<_> = second.nodes.iter().map(|n| n.name.clone()).collect();
    first_names.sort();
    second_names.sort();
    assert_eq!(first_names, second_names);
    assert_eq!(first.edges.len(), second.edges.len());
}
