use axum::{
    http::header,
    response::{Html, IntoResponse},
};

/// Chart page. The script opens a session and fills both selectors from it.
pub async fn chart_page() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Html(PAGE_HTML),
    )
}

const PAGE_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sensor Chart</title>
    <style>
        :root {
            --bg: #f8fafc;
            --surface: #ffffff;
            --border: #e2e8f0;
            --text: #1e293b;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); }
        .container { max-width: 1200px; margin: 0 auto; padding: 1.5rem; }
        header { display: flex; gap: 1rem; align-items: center; margin-bottom: 1rem; flex-wrap: wrap; }
        h1 { font-size: 1.25rem; font-weight: 600; flex: 1; }
        select {
            padding: 0.5rem 0.75rem;
            border: 1px solid var(--border);
            border-radius: 0.375rem;
            background: var(--surface);
            font-size: 0.875rem;
        }
        .chart-box {
            background: var(--surface);
            border: 1px solid var(--border);
            border-radius: 0.5rem;
            padding: 1rem;
        }
    </style>
</head>
<body>
<div class="container">
    <header>
        <h1>Sensor Chart</h1>
        <select id="device-select"></select>
        <select id="timeframe-select"></select>
    </header>
    <div class="chart-box">
        <canvas id="chart"></canvas>
    </div>
</div>
<script src="https://cdn.jsdelivr.net/npm/moment@2.30.1/moment.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/chart.js@2.9.4/dist/Chart.min.js"></script>
<script>
const deviceSelect = document.getElementById('device-select');
const timeframeSelect = document.getElementById('timeframe-select');
const canvas = document.getElementById('chart');
let session = null;
let chart = null;
let revision = -1;

function render(config) {
    if (config.revision === revision) return;
    revision = config.revision;
    if (chart === null) {
        chart = new Chart(canvas.getContext('2d'), {
            type: config.type,
            data: config.data,
            options: config.options
        });
        return;
    }
    chart.data = config.data;
    chart.options = config.options;
    chart.update();
}

function checked(response) {
    if (response.ok) return response.json();
    throw new Error('Something went wrong on api server!');
}

function fillSelect(select, control) {
    select.length = 0;
    control.options.forEach((o, i) => select.add(new Option(o.text, o.value, false, i === control.selected)));
}

// fill = false keeps what the user picked when an expired session is replaced
function openSession(fill) {
    return fetch('/api/sessions', { method: 'POST' })
        .then(checked)
        .then(s => {
            session = s.id;
            revision = -1;
            if (fill) {
                fillSelect(deviceSelect, s.selectors.device);
                fillSelect(timeframeSelect, s.selectors.timeframe);
            }
        });
}

function putSelection() {
    return fetch(`/api/sessions/${session}/selection`, {
        method: 'PUT',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ device: deviceSelect.value, timeframe: timeframeSelect.value })
    });
}

function requestChart() {
    putSelection()
        .then(r => r.status === 404 ? openSession(false).then(putSelection) : r)
        .then(checked)
        .then(r => render(r.chart))
        .catch(e => console.error(e));
}

// Picks up server-side refreshes of this session's chart
function pollChart() {
    if (session === null) return;
    fetch(`/api/sessions/${session}/chart`)
        .then(r => r.status === 404 ? null : checked(r))
        .then(c => c && render(c))
        .catch(e => console.error(e));
}

deviceSelect.addEventListener('change', requestChart);
timeframeSelect.addEventListener('change', requestChart);
setInterval(pollChart, 60000);

openSession(true).then(requestChart).catch(e => console.error(e));
</script>
</body>
</html>
"##;
