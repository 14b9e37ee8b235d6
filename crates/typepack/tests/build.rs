mod common;

use std::{
  path::Path,
  sync::{Arc, Mutex},
};

use common::{bundler, dependencies, names, options, project, read};
use typepack::{
  Bundler, BundlerOptions, FileSystem, HookBuildEndArgs, HookNoopReturn, Plugin, PluginContext,
};

#[tokio::test]
async fn entry_is_part_of_its_own_set() {
  let fs = project(&[("/project/src/index.ts", "export const version = \"1.0.0\";\n")]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  let output = bundler.build().await.unwrap();
  assert_eq!(names(&output.modules), vec!["/project/src/index.ts"]);
  assert_eq!(dependencies(&bundler, "/project/src/index.ts"), vec!["/project/src/index.ts"]);
}

#[tokio::test]
async fn import_chains_are_tracked_and_siblings_are_not() {
  let fs = project(&[
    ("/project/src/a.ts", "import { b } from \"./b\";\nexport const a: number = b;\n"),
    ("/project/src/b.ts", "import { c } from \"./c.js\";\nexport const b: number = c;\n"),
    ("/project/src/c.ts", "export const c = 1;\n"),
    ("/project/src/sibling.ts", "export const sibling = 1;\n"),
  ]);
  let mut bundler = bundler(&fs, options(&["src/a.ts"]));
  bundler.build().await.unwrap();
  assert_eq!(
    dependencies(&bundler, "/project/src/a.ts"),
    vec!["/project/src/a.ts", "/project/src/b.ts", "/project/src/c.ts"]
  );
  assert!(!bundler.graph().contains("/project/src/sibling.ts"));
}

#[tokio::test]
async fn shared_modules_are_walked_from_their_first_owner() {
  let fs = project(&[
    ("/project/src/a.ts", "export { shared } from \"./shared\";\n"),
    ("/project/src/b.ts", "export { shared } from \"./shared\";\n"),
    ("/project/src/shared.ts", "export { inner as shared } from \"./inner\";\n"),
    ("/project/src/inner.ts", "export const inner = 1;\n"),
  ]);
  let mut bundler = bundler(&fs, options(&["src/a.ts", "src/b.ts"]));
  bundler.build().await.unwrap();

  let a = dependencies(&bundler, "/project/src/a.ts");
  let b = dependencies(&bundler, "/project/src/b.ts");
  assert!(a.contains(&"/project/src/shared.ts".to_string()));
  assert!(b.contains(&"/project/src/shared.ts".to_string()));
  assert!(a.contains(&"/project/src/inner.ts".to_string()));
  assert!(!b.contains(&"/project/src/inner.ts".to_string()));
  assert_eq!(bundler.graph().owner("/project/src/shared.ts").as_deref(), Some("/project/src/a.ts"));
}

#[tokio::test]
async fn only_requested_declarations_are_emitted() {
  let fs = project(&[
    ("/project/src/index.ts", "export { foo } from \"./utils\";\n"),
    (
      "/project/src/utils.ts",
      "import { helper } from \"./helper\";\n\
       export function foo(): string {\n  return helper();\n}\n\
       export function bar(): number {\n  return 1;\n}\n",
    ),
    ("/project/src/helper.ts", "export function helper(): string {\n  return \"helper\";\n}\n"),
  ]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  let output = bundler.build().await.unwrap();

  let dts = read(&fs, "/project/dist/index.d.ts");
  assert!(dts.contains("// utils.ts"), "{dts}");
  assert!(dts.contains("export declare function foo(): string;"), "{dts}");
  assert!(!dts.contains("bar"), "{dts}");
  assert!(!dts.contains("helper"), "{dts}");
  assert!(!dts.contains("from \"./"), "{dts}");

  assert_eq!(output.assets.len(), 1);
  assert_eq!(output.assets[0].filename(), "index.d.ts");
  assert_eq!(output.assets[0].content, dts);
  assert_eq!(output.modules.len(), 3);
}

#[tokio::test]
async fn sibling_variables_of_one_statement_are_pruned() {
  let fs = project(&[
    ("/project/src/index.ts", "export { a } from \"./m\";\n"),
    ("/project/src/m.ts", "export const a: number = 1, secret: string = \"s\";\n"),
  ]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  bundler.build().await.unwrap();

  let dts = read(&fs, "/project/dist/index.d.ts");
  assert!(dts.contains("export declare const a: number;"), "{dts}");
  assert!(!dts.contains("secret"), "{dts}");
}

#[tokio::test]
async fn referenced_declarations_are_included_without_export() {
  let fs = project(&[
    ("/project/src/index.ts", "export { make } from \"./options\";\n"),
    (
      "/project/src/options.ts",
      "export interface Options {\n  name: string;\n}\n\
       export function make(name: string): Options {\n  return { name };\n}\n\
       export function unrelated(): void {}\n",
    ),
  ]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  bundler.build().await.unwrap();

  let dts = read(&fs, "/project/dist/index.d.ts");
  assert!(dts.contains("export declare function make(name: string): Options;"), "{dts}");
  assert!(dts.contains("interface Options"), "{dts}");
  assert!(!dts.contains("export interface Options"), "{dts}");
  assert!(!dts.contains("unrelated"), "{dts}");
}

#[tokio::test]
async fn unused_relative_imports_bring_nothing() {
  let fs = project(&[
    (
      "/project/src/index.ts",
      "import type { Used, Unused } from \"./types\";\n\
       export function run(input: Used): void {}\n\
       export function check(value: unknown): boolean {\n  return (value as Unused) !== undefined;\n}\n",
    ),
    (
      "/project/src/types.ts",
      "export interface Used {\n  a: string;\n}\nexport interface Unused {\n  b: string;\n}\n",
    ),
  ]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  bundler.build().await.unwrap();

  let dts = read(&fs, "/project/dist/index.d.ts");
  assert!(dts.contains("export declare function run(input: Used): void;"), "{dts}");
  assert!(dts.contains("interface Used"), "{dts}");
  assert!(!dts.contains("Unused"), "{dts}");
  assert!(!dts.contains("import"), "{dts}");
}

#[tokio::test]
async fn external_imports_are_preserved() {
  let fs = project(&[(
    "/project/src/index.ts",
    "import type { Readable } from \"node:stream\";\n\
     export function pipe(source: Readable): void {}\n",
  )]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  let output = bundler.build().await.unwrap();
  assert!(output.warnings.is_empty());

  let dts = read(&fs, "/project/dist/index.d.ts");
  assert!(dts.contains("import type { Readable } from \"node:stream\";"), "{dts}");
  assert!(dts.contains("export declare function pipe(source: Readable): void;"), "{dts}");
}

#[tokio::test]
async fn entries_without_declarations_produce_empty_files() {
  let fs = project(&[("/project/src/main.ts", "console.log(\"hello\");\n")]);
  let mut bundler = bundler(&fs, options(&["src/main.ts"]));
  let output = bundler.build().await.unwrap();
  assert_eq!(read(&fs, "/project/dist/main.d.ts"), "");
  assert_eq!(output.assets.len(), 1);
}

#[tokio::test]
async fn every_entry_gets_its_own_file() {
  let fs = project(&[
    ("/project/src/client.ts", "export { connect } from \"./net\";\n"),
    ("/project/src/server/main.ts", "export { listen } from \"./http\";\n"),
    ("/project/src/net.ts", "export function connect(): void {}\n"),
    ("/project/src/server/http.ts", "export function listen(port: number): void {}\n"),
  ]);
  let mut bundler = bundler(&fs, options(&["src/client.ts", "src/server/main.ts"]));
  let output = bundler.build().await.unwrap();

  let client = read(&fs, "/project/dist/client.d.ts");
  let server = read(&fs, "/project/dist/server/main.d.ts");
  assert!(client.contains("connect"), "{client}");
  assert!(!client.contains("listen"), "{client}");
  assert!(server.contains("listen"), "{server}");
  assert!(!server.contains("connect"), "{server}");

  let mut filenames = output.assets.iter().map(|asset| asset.filename().to_string()).collect::<Vec<_>>();
  filenames.sort();
  assert_eq!(filenames, vec!["client.d.ts", "server/main.d.ts"]);
}

#[tokio::test]
async fn plain_source_wins_over_markup_variant() {
  let fs = project(&[
    ("/project/src/index.ts", "export { Button } from \"./button\";\n"),
    ("/project/src/button.ts", "export function Button(): string {\n  return \"ts\";\n}\n"),
    ("/project/src/button.tsx", "export function Button(): number {\n  return 1;\n}\n"),
  ]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  bundler.build().await.unwrap();
  assert_eq!(
    dependencies(&bundler, "/project/src/index.ts"),
    vec!["/project/src/index.ts", "/project/src/button.ts"]
  );
  assert!(read(&fs, "/project/dist/index.d.ts").contains("Button(): string"));
}

#[tokio::test]
async fn explicit_root_controls_the_output_layout() {
  let fs = project(&[("/project/src/lib/index.ts", "export const a = 1;\n")]);
  let mut bundler = bundler(
    &fs,
    BundlerOptions { root: Some("src".into()), ..options(&["src/lib/index.ts"]) },
  );
  bundler.build().await.unwrap();
  assert!(fs.is_file(Path::new("/project/dist/lib/index.d.ts")));
}

#[tokio::test]
async fn declarations_are_skipped_without_an_output_directory() {
  let fs = project(&[("/project/src/index.ts", "export const a = 1;\n")]);
  let mut without_dir = bundler(&fs, BundlerOptions { dir: None, ..options(&["src/index.ts"]) });
  assert!(without_dir.build().await.unwrap().assets.is_empty());

  let mut without_dts =
    bundler(&fs, BundlerOptions { dts: Some(false), ..options(&["src/index.ts"]) });
  assert!(without_dts.build().await.unwrap().assets.is_empty());
  assert!(!fs.exists(Path::new("/project/dist")));
}

#[tokio::test]
async fn missing_entries_abort_the_build() {
  let fs = project(&[("/project/src/index.ts", "export const a = 1;\n")]);
  let mut bundler = bundler(&fs, options(&["src/index.ts", "src/missing.ts"]));
  let errors = bundler.build().await.unwrap_err();
  assert_eq!(errors.len(), 1);
  assert!(errors[0].to_string().contains("/project/src/missing.ts"), "{}", errors[0]);
  assert!(bundler.graph().is_empty());
  assert!(!fs.exists(Path::new("/project/dist")));
}

#[tokio::test]
async fn unresolved_relative_imports_are_warnings() {
  let fs = project(&[(
    "/project/src/index.ts",
    "export { gone } from \"./gone\";\nexport const kept = 1;\n",
  )]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  let output = bundler.build().await.unwrap();
  assert_eq!(output.warnings.len(), 1);
  assert!(output.warnings[0].to_string().contains("./gone"));

  let dts = read(&fs, "/project/dist/index.d.ts");
  assert!(dts.contains("// [typepack] missing declaration: gone"), "{dts}");
  assert!(dts.contains("export declare const kept = 1;"), "{dts}");
}

#[tokio::test]
async fn syntax_errors_fail_the_build_but_keep_declarations() {
  let fs = project(&[
    ("/project/src/index.ts", "export { ok } from \"./ok\";\nexport { broken } from \"./broken\";\n"),
    ("/project/src/ok.ts", "export const ok = 1;\n"),
    ("/project/src/broken.ts", "export const broken = ;\n"),
  ]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  let errors = bundler.build().await.unwrap_err();
  assert_eq!(errors.len(), 1);
  assert!(errors[0].to_string().contains("/project/src/broken.ts"), "{}", errors[0]);

  let dts = read(&fs, "/project/dist/index.d.ts");
  assert!(dts.contains("export declare const ok = 1;"), "{dts}");
  assert!(dts.contains("// [typepack] missing declaration: broken.ts"), "{dts}");
}

#[tokio::test]
async fn rebuilding_replaces_previous_results() {
  let fs = project(&[
    ("/project/src/index.ts", "export { a } from \"./a\";\n"),
    ("/project/src/a.ts", "export const a = 1;\n"),
    ("/project/src/b.ts", "export const b = 2;\n"),
  ]);
  let mut bundler = bundler(&fs, options(&["src/index.ts"]));
  bundler.build().await.unwrap();
  assert!(bundler.graph().contains("/project/src/a.ts"));

  fs.add_file(Path::new("/project/src/index.ts"), "export { b } from \"./b\";\n").unwrap();
  bundler.build().await.unwrap();
  assert!(!bundler.graph().contains("/project/src/a.ts"));
  assert!(bundler.graph().contains("/project/src/b.ts"));
  let dts = read(&fs, "/project/dist/index.d.ts");
  assert!(dts.contains("export declare const b = 2;"), "{dts}");
  assert!(!dts.contains("const a"), "{dts}");
}

struct BuildEndRecorder {
  outcomes: Arc<Mutex<Vec<(bool, usize)>>>,
}

impl Plugin for BuildEndRecorder {
  fn build_end(&self, ctx: &PluginContext, args: &HookBuildEndArgs) -> HookNoopReturn {
    self.outcomes.lock().unwrap().push((args.is_success(), ctx.entries().len()));
    Ok(())
  }
}

#[tokio::test]
async fn extra_plugins_see_every_build_end() {
  let fs = project(&[
    ("/project/src/index.ts", "export const a = 1;\n"),
    ("/project/src/broken.ts", "export const = ;\n"),
  ]);
  let outcomes = Arc::new(Mutex::new(vec![]));
  let recorder = BuildEndRecorder { outcomes: Arc::clone(&outcomes) };
  let mut good =
    Bundler::with_plugins(options(&["src/index.ts"]), Arc::new(fs.clone()), vec![Arc::new(recorder)])
      .unwrap();
  good.build().await.unwrap();

  let recorder = BuildEndRecorder { outcomes: Arc::clone(&outcomes) };
  let mut bad = Bundler::with_plugins(
    options(&["src/index.ts", "src/broken.ts"]),
    Arc::new(fs.clone()),
    vec![Arc::new(recorder)],
  )
  .unwrap();
  assert!(bad.build().await.is_err());

  assert_eq!(*outcomes.lock().unwrap(), vec![(true, 1), (false, 2)]);
}
