// Single upload page served at `/`. Results are inserted with textContent;
// chart markup comes from the server's own SVG renderer.

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Bug Classifier</title>
<style>
  body { font-family: sans-serif; margin: 2rem auto; max-width: 1100px; color: #222; }
  h1 { font-size: 1.6rem; }
  .charts { display: flex; flex-wrap: wrap; gap: 2rem; }
  .error { color: #b00020; font-weight: bold; }
  .warning { color: #8a6d00; }
  table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
  th, td { border: 1px solid #ddd; padding: 4px 8px; text-align: left; }
  th { background: #f3f3f3; }
</style>
</head>
<body>
<h1>Bug Classification &amp; Logic-Level Issue Analyzer</h1>
<p>Upload a CSV or Excel file with a <code>Details</code> column.</p>
<input type="file" id="file" accept=".csv,.xlsx">
<p id="status"></p>
<ul id="warnings"></ul>
<div class="charts">
  <section><h3>Pie Chart: Bug Origin by Type</h3><div id="pie"></div></section>
  <section><h3>Bar Chart: Logic-Level Bugs by Category</h3><div id="bar"></div></section>
</div>
<h3>Table: Bug Classification Results</h3>
<table id="results"></table>
<script>
const COLUMNS = [
  ["bug_id", "Bug ID"],
  ["details", "Details"],
  ["predicted_category", "Predicted Category"],
  ["logic_level_issue", "Logic-level Issue"],
  ["confidence_score", "Confidence Score"],
];

function clear() {
  for (const id of ["warnings", "pie", "bar", "results"]) {
    document.getElementById(id).replaceChildren();
  }
}

function cellText(value) {
  if (value === null || value === undefined) return "";
  if (typeof value === "boolean") return value ? "True" : "False";
  return String(value);
}

function renderTable(rows) {
  const table = document.getElementById("results");
  const head = table.insertRow();
  for (const [, title] of COLUMNS) {
    const th = document.createElement("th");
    th.textContent = title;
    head.appendChild(th);
  }
  for (const row of rows) {
    const tr = table.insertRow();
    for (const [key] of COLUMNS) {
      tr.insertCell().textContent = cellText(row[key]);
    }
  }
}

document.getElementById("file").addEventListener("change", async (event) => {
  const file = event.target.files[0];
  const status = document.getElementById("status");
  clear();
  if (!file) return;
  status.className = "";
  status.textContent = "Classifying " + file.name + "...";

  try {
    const response = await fetch("/api/classify?file_name=" + encodeURIComponent(file.name), {
      method: "POST",
      headers: { "Content-Type": "application/octet-stream" },
      body: file,
    });
    const body = await response.json();
    if (!response.ok) {
      status.className = "error";
      status.textContent = "Error: " + body.error;
      return;
    }
    status.textContent = "File uploaded successfully (" + body.report.rows.length + " rows)";
    for (const warning of body.report.warnings) {
      const li = document.createElement("li");
      li.className = "warning";
      li.textContent = warning;
      document.getElementById("warnings").appendChild(li);
    }
    if (body.charts.pie) document.getElementById("pie").innerHTML = body.charts.pie;
    if (body.charts.bar) document.getElementById("bar").innerHTML = body.charts.bar;
    renderTable(body.report.rows);
  } catch (err) {
    status.className = "error";
    status.textContent = "Error: " + err;
  }
});
</script>
</body>
</html>
"##;
