//! Embedded upload page.

pub const UPLOAD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>FITS metrics</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 36rem; margin: 3rem auto; }
    table { border-collapse: collapse; margin-top: 1.5rem; }
    td, th { padding: .3rem 1rem; border-bottom: 1px solid #ddd; text-align: left; }
    .error { color: #b00020; margin-top: 1.5rem; }
  </style>
</head>
<body>
  <h1>Score a prediction</h1>
  <p>Upload a <code>.fits</code> image with the same shape as the ground truth.</p>
  <form id="upload">
    <input type="file" name="pred_file" accept=".fits">
    <button type="submit">Calculate</button>
  </form>
  <div id="result"></div>
  <script>
    const form = document.getElementById('upload');
    const out = document.getElementById('result');
    form.addEventListener('submit', async (ev) => {
      ev.preventDefault();
      out.textContent = 'Scoring...';
      const res = await fetch('/calculate', { method: 'POST', body: new FormData(form) });
      const body = await res.json();
      out.replaceChildren();
      if (!res.ok) {
        const p = document.createElement('p');
        p.className = 'error';
        p.textContent = body.error;
        out.append(p);
        return;
      }
      const table = document.createElement('table');
      for (const [label, key] of [['File', 'filename'], ['PSNR', 'psnr'], ['SNR', 'snr'], ['Log SNR', 'logsnr']]) {
        const row = table.insertRow();
        row.insertCell().textContent = label;
        row.insertCell().textContent = body[key];
      }
      out.append(table);
    });
  </script>
</body>
</html>
"#;
