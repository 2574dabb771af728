use crate::calendar::{MonthGrid, TARGET_YEAR};
use crate::models::TimerResponse;

/// Renders the single page: timer card plus the full-year heatmap. The grid
/// is rendered server-side from the ledger; the page script keeps the clock
/// fresh and patches single cells as sessions complete.
pub fn render_index(
    today: &str,
    today_count: u32,
    months: &[MonthGrid],
    timer: &TimerResponse,
) -> String {
    INDEX_HTML
        .replace("{{DATE}}", today)
        .replace("{{TODAY_COUNT}}", &today_count.to_string())
        .replace("{{CLOCK}}", &timer.display)
        .replace("{{DURATION}}", &timer.duration_minutes.to_string())
        .replace("{{GENERATION}}", &timer.generation.to_string())
        .replace("{{SESSIONS}}", &timer.sessions_completed.to_string())
        .replace("{{YEAR}}", &TARGET_YEAR.to_string())
        .replace("{{GRID}}", &render_grid(months))
}

fn render_grid(months: &[MonthGrid]) -> String {
    let mut html = String::new();
    for month in months {
        html.push_str("<div class=\"month\">\n");
        html.push_str(&format!("<h3>{}</h3>\n", month.name));
        html.push_str("<div class=\"month-grid\">\n");
        for dow in ["M", "T", "W", "T", "F", "S", "S"] {
            html.push_str(&format!("<span class=\"dow\">{dow}</span>"));
        }
        for _ in 0..month.leading_blanks {
            html.push_str("<span class=\"blank\"></span>");
        }
        for cell in &month.cells {
            html.push_str(&format!(
                "<div class=\"cell {}\" id=\"d-{}\" title=\"{}\"></div>",
                cell.level, cell.date, cell.label
            ));
        }
        html.push_str("\n</div>\n</div>\n");
    }
    html
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Focusgrid</title>
  <style>
    :root {
      --bg-1: #f6f8f6;
      --bg-2: #dcebd9;
      --ink: #22302a;
      --accent: #239a3b;
      --accent-dark: #196127;
      --card: #ffffff;
      --line: rgba(34, 48, 42, 0.12);
      --shadow: 0 18px 48px rgba(34, 48, 42, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 55%),
        linear-gradient(160deg, var(--bg-1), #eef4ee);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      justify-items: center;
      padding: 32px 18px 48px;
      gap: 28px;
    }

    .card {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 24px;
      border: 1px solid var(--line);
      box-shadow: var(--shadow);
      padding: 28px 32px;
      display: grid;
      gap: 18px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
    }

    .subtitle {
      margin: 4px 0 0;
      color: #60706a;
      font-size: 0.95rem;
    }

    .timer {
      display: grid;
      justify-items: center;
      gap: 12px;
    }

    #clock {
      font-size: clamp(3rem, 10vw, 5rem);
      font-variant-numeric: tabular-nums;
      font-weight: 600;
      cursor: pointer;
      letter-spacing: 0.04em;
    }

    #clock.editing-hidden {
      display: none;
    }

    #duration-input {
      font-size: 2.4rem;
      width: 7ch;
      text-align: center;
      border: 2px solid var(--accent);
      border-radius: 12px;
      padding: 4px 8px;
      display: none;
    }

    #duration-input.visible {
      display: block;
    }

    .phase-pill {
      padding: 4px 14px;
      border-radius: 999px;
      background: rgba(35, 154, 59, 0.12);
      color: var(--accent-dark);
      font-size: 0.85rem;
      font-weight: 600;
      text-transform: uppercase;
      letter-spacing: 0.1em;
    }

    .controls {
      display: flex;
      gap: 12px;
      flex-wrap: wrap;
      justify-content: center;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 26px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      transition: transform 120ms ease;
    }

    button:active {
      transform: scale(0.97);
    }

    .btn-start {
      background: var(--accent);
      color: white;
    }

    .btn-pause {
      background: #2f4858;
      color: white;
    }

    .btn-reset {
      background: rgba(34, 48, 42, 0.08);
      color: var(--ink);
    }

    .today-line {
      text-align: center;
      color: #60706a;
      font-size: 0.95rem;
    }

    .heatmap {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(180px, 1fr));
      gap: 18px;
    }

    .month h3 {
      margin: 0 0 6px;
      font-size: 0.95rem;
      color: #4a5a52;
    }

    .month-grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 3px;
    }

    .dow {
      font-size: 0.6rem;
      color: #8a968f;
      text-align: center;
    }

    .cell,
    .blank {
      aspect-ratio: 1;
      border-radius: 3px;
    }

    .cell.empty {
      background: #ebedf0;
    }

    .cell.level-1 {
      background: #c6e48b;
    }

    .cell.level-2 {
      background: #7bc96f;
    }

    .cell.level-3 {
      background: #239a3b;
    }

    .cell.level-4 {
      background: #196127;
    }

    .legend {
      display: flex;
      align-items: center;
      gap: 6px;
      justify-content: flex-end;
      font-size: 0.8rem;
      color: #60706a;
    }

    .legend .cell {
      width: 12px;
    }

    .danger-row {
      display: flex;
      justify-content: flex-end;
    }

    .btn-danger {
      background: rgba(198, 59, 43, 0.1);
      color: #c63b2b;
      font-size: 0.85rem;
      padding: 8px 18px;
    }

    #toast {
      position: fixed;
      bottom: 24px;
      left: 50%;
      transform: translate(-50%, 12px);
      background: var(--ink);
      color: white;
      padding: 10px 22px;
      border-radius: 999px;
      font-size: 0.9rem;
      opacity: 0;
      pointer-events: none;
      transition: opacity 200ms ease, transform 200ms ease;
    }

    #toast.show {
      opacity: 1;
      transform: translate(-50%, 0);
    }
  </style>
</head>
<body>
  <main class="card">
    <header>
      <h1>Focusgrid</h1>
      <p class="subtitle">Countdown focus timer with a {{YEAR}} activity calendar. Click the clock to change the session length.</p>
    </header>

    <section class="timer">
      <span id="phase" class="phase-pill">idle</span>
      <div id="clock">{{CLOCK}}</div>
      <input id="duration-input" type="text" inputmode="numeric" aria-label="Session length in minutes" />
      <div class="controls">
        <button class="btn-start" id="start-btn" type="button">Start</button>
        <button class="btn-pause" id="pause-btn" type="button">Pause</button>
        <button class="btn-reset" id="reset-btn" type="button">Reset</button>
      </div>
      <div class="today-line">{{DATE}} &middot; <span id="today-count">{{TODAY_COUNT}}</span> session(s) today &middot; <span id="duration">{{DURATION}}</span> min per session</div>
    </section>
  </main>

  <section class="card">
    <div class="legend">
      Less
      <div class="cell empty"></div>
      <div class="cell level-1"></div>
      <div class="cell level-2"></div>
      <div class="cell level-3"></div>
      <div class="cell level-4"></div>
      More
    </div>
    <div class="heatmap">
{{GRID}}
    </div>
    <div class="danger-row">
      <button class="btn-danger" id="reset-all-btn" type="button">Clear all activity</button>
    </div>
  </section>

  <div id="toast" role="status"></div>

  <script>
    const clockEl = document.getElementById('clock');
    const phaseEl = document.getElementById('phase');
    const durationEl = document.getElementById('duration');
    const inputEl = document.getElementById('duration-input');
    const todayCountEl = document.getElementById('today-count');
    const toastEl = document.getElementById('toast');

    const pageDate = '{{DATE}}';
    let generation = Number('{{GENERATION}}');
    let sessionsCompleted = Number('{{SESSIONS}}');
    let editing = false;
    let toastTimer = null;

    const toast = (message) => {
      toastEl.textContent = message;
      toastEl.classList.add('show');
      clearTimeout(toastTimer);
      toastTimer = setTimeout(() => toastEl.classList.remove('show'), 2200);
    };

    const patchCell = (cell) => {
      if (!cell) {
        return;
      }
      const el = document.getElementById('d-' + cell.date);
      if (el) {
        el.className = 'cell ' + cell.level;
        el.title = cell.label;
      }
      todayCountEl.textContent = cell.count;
    };

    const apply = (data) => {
      if (data.generation !== generation) {
        // Rollover or full reset: announce a day change, then rebuild the
        // whole grid.
        generation = data.generation;
        get('/api/activity').then((activity) => {
          if (activity.today !== pageDate) {
            toast('New day: ' + activity.today);
          }
          setTimeout(() => location.reload(), 600);
        }).catch(() => location.reload());
        return;
      }
      if (data.sessions_completed > sessionsCompleted) {
        sessionsCompleted = data.sessions_completed;
        patchCell(data.last_completed);
        toast('Focus session complete');
      }
      clockEl.textContent = data.display;
      phaseEl.textContent = data.phase;
      durationEl.textContent = data.duration_minutes;
      editing = data.phase === 'editing';
      clockEl.classList.toggle('editing-hidden', editing);
      inputEl.classList.toggle('visible', editing);
    };

    const get = async (url) => {
      const res = await fetch(url);
      if (!res.ok) {
        throw new Error(await res.text() || 'Request failed');
      }
      return res.json();
    };

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body || {})
      });
      if (!res.ok) {
        throw new Error(await res.text() || 'Request failed');
      }
      return res.json();
    };

    const poll = () => get('/api/timer').then(apply).catch(() => {});

    document.getElementById('start-btn').addEventListener('click', () => {
      post('/api/timer/start').then(apply).catch((err) => toast(err.message));
    });

    document.getElementById('pause-btn').addEventListener('click', () => {
      post('/api/timer/pause').then(apply).catch((err) => toast(err.message));
    });

    document.getElementById('reset-btn').addEventListener('click', () => {
      post('/api/timer/reset').then((data) => {
        apply(data);
        toast('Timer reset');
      }).catch((err) => toast(err.message));
    });

    clockEl.addEventListener('click', () => {
      post('/api/timer/edit/begin').then((data) => {
        apply(data);
        if (data.phase === 'editing') {
          inputEl.value = data.duration_minutes;
          inputEl.focus();
          inputEl.select();
        }
      }).catch((err) => toast(err.message));
    });

    inputEl.addEventListener('keydown', (event) => {
      if (event.key === 'Enter') {
        const before = durationEl.textContent;
        post('/api/timer/edit/commit', { value: inputEl.value }).then((data) => {
          apply(data);
          if (String(data.duration_minutes) !== before) {
            toast('Session length: ' + data.duration_minutes + ' min');
          }
        }).catch((err) => toast(err.message));
      } else if (event.key === 'Escape') {
        post('/api/timer/edit/cancel').then(apply).catch((err) => toast(err.message));
      }
    });

    document.getElementById('reset-all-btn').addEventListener('click', () => {
      if (!confirm('Clear all recorded sessions? This cannot be undone.')) {
        return;
      }
      post('/api/activity/reset', { confirm: true }).then(() => {
        toast('All activity cleared');
        setTimeout(() => location.reload(), 400);
      }).catch((err) => toast(err.message));
    });

    // An immediate recomputation when the tab becomes visible again, ahead of
    // the next scheduled poll, so the clock never shows stale time.
    document.addEventListener('visibilitychange', () => {
      if (!document.hidden) {
        poll();
      }
    });

    setInterval(poll, 250);
    poll();
  </script>
</body>
</html>
"#;
