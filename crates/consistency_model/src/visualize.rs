use {
    crate::{CheckResult, LinearizationInfo, Model, Operation},
    serde::Serialize,
    std::{fs, io, path::Path},
};

#[derive(Serialize)]
struct Page {
    partitions: Vec<PartitionView>,
}

#[derive(Serialize)]
struct PartitionView {
    result: CheckResult,
    operations: Vec<OperationView>,
    linearization: Vec<StepView>,
}

#[derive(Serialize)]
struct OperationView {
    index: usize,
    client: u64,
    call: i64,
    ret: i64,
    description: String,
}

#[derive(Serialize)]
struct StepView {
    index: usize,
    description: String,
    state: String,
}

/// Renders a checked history as a standalone HTML page.
///
/// For every partition the page lists the operations with their client and timestamps, then
/// replays the longest linearization found through `model`, showing the state after each step.
pub fn visualize<M: Model>(
    model: &M,
    history: &[Operation<M::Input, M::Output>],
    info: &LinearizationInfo,
) -> String {
    let page = Page {
        partitions: info
            .partitions
            .iter()
            .map(|partition| {
                let operations = partition
                    .operations
                    .iter()
                    .map(|&index| {
                        let op = &history[index];
                        OperationView {
                            index,
                            client: op.client_id,
                            call: op.call,
                            ret: op.ret,
                            description: model.describe_operation(&op.input, &op.output),
                        }
                    })
                    .collect();
                let mut state = model.init();
                let linearization = partition
                    .linearization
                    .iter()
                    .map(|&index| {
                        let op = &history[index];
                        state = model.step(&state, &op.input, &op.output).1;
                        StepView {
                            index,
                            description: model.describe_operation(&op.input, &op.output),
                            state: model.describe_state(&state),
                        }
                    })
                    .collect();
                PartitionView {
                    result: partition.result,
                    operations,
                    linearization,
                }
            })
            .collect(),
    };
    // Serializing plain structs of strings and integers cannot fail.
    let json = serde_json::to_string(&page)
        .unwrap_or_else(|_| String::from(r#"{"partitions":[]}"#));
    TEMPLATE.replace("@DATA@", &json.replace("</", "<\\/"))
}

/// Like [`visualize`], but writes the page to `path`.
pub fn visualize_path<M: Model>(
    model: &M,
    history: &[Operation<M::Input, M::Output>],
    info: &LinearizationInfo,
    path: impl AsRef<Path>,
) -> io::Result<()> {
    fs::write(path, visualize(model, history, info))
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Linearizability</title>
<style>
body { font-family: monospace; margin: 2em; }
table { border-collapse: collapse; margin-bottom: 1em; }
td, th { border: 1px solid #ccc; padding: 2px 8px; text-align: left; }
.Ok { color: #2a7f2a; }
.Illegal { color: #b22222; }
.Unknown { color: #b8860b; }
</style>
</head>
<body>
<div id="root"></div>
<script>
const data = @DATA@;
const root = document.getElementById("root");
function el(tag, text, cls) {
  const e = document.createElement(tag);
  if (text !== undefined) e.textContent = text;
  if (cls) e.className = cls;
  return e;
}
function table(head, rows) {
  const t = el("table");
  const tr = el("tr");
  head.forEach(h => tr.appendChild(el("th", h)));
  t.appendChild(tr);
  rows.forEach(r => {
    const row = el("tr");
    r.forEach(c => row.appendChild(el("td", String(c))));
    t.appendChild(row);
  });
  return t;
}
data.partitions.forEach((p, i) => {
  root.appendChild(el("h2", "Partition " + i + ": " + p.result, p.result));
  root.appendChild(el("h3", "Operations"));
  root.appendChild(table(["#", "client", "call", "return", "operation"],
    p.operations.map(o => [o.index, o.client, o.call, o.ret, o.description])));
  root.appendChild(el("h3", "Longest linearization (" + p.linearization.length + " of " + p.operations.length + ")"));
  root.appendChild(table(["#", "operation", "state after"],
    p.linearization.map(s => [s.index, s.description, s.state])));
});
</script>
</body>
</html>
"##;
