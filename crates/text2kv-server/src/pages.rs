//! Rendered bodies for the config page and the two uploader scripts.
//!
//! The scripts read at most 2000 lines of a local file, base64 it, and hit
//! `https://<host>/<file>?token=<token>&b64=<data>`, which lands in the
//! generic write path.

/// Windows batch uploader. Lines are CRLF-joined.
pub fn bat_script(host: &str, token: &str) -> String {
    [
        "@echo off".to_owned(),
        "chcp 65001".to_owned(),
        "setlocal".to_owned(),
        String::new(),
        format!("set \"DOMAIN={host}\""),
        format!("set \"TOKEN={token}\""),
        String::new(),
        "set \"FILENAME=%~nx1\"".to_owned(),
        String::new(),
        "for /f \"delims=\" %%i in ('powershell -command \"$content = ((Get-Content -Path '%cd%/%FILENAME%' -Encoding UTF8) | Select-Object -First 2000) -join [Environment]::NewLine; [convert]::ToBase64String([System.Text.Encoding]::UTF8.GetBytes($content))\"') do set \"BASE64_TEXT=%%i\"".to_owned(),
        String::new(),
        "set \"URL=https://%DOMAIN%/%FILENAME%?token=%TOKEN%^&b64=%BASE64_TEXT%\"".to_owned(),
        String::new(),
        "start %URL%".to_owned(),
        "endlocal".to_owned(),
        String::new(),
        "echo 更新数据完成,倒数5秒后自动关闭窗口...".to_owned(),
        "timeout /t 5 >nul".to_owned(),
        "exit".to_owned(),
    ]
    .join("\r\n")
}

/// POSIX shell uploader; takes the file name as `$1`.
pub fn sh_script(host: &str, token: &str) -> String {
    format!(
        r#"#!/bin/bash
export LANG=zh_CN.UTF-8
DOMAIN="{host}"
TOKEN="{token}"
if [ -n "$1" ]; then
  FILENAME="$1"
else
  echo "无文件名"
  exit 1
fi
BASE64_TEXT=$(head -n 2000 $FILENAME | base64 -w 0)
curl -k "https://{host}/${{FILENAME}}?token={token}&b64=${{BASE64_TEXT}}"
echo "更新数据完成"
"#
    )
}

/// Status page showing the (already truncated) IP list.
pub fn config_html(host: &str, token: &str, ip_list: &str) -> String {
    let host = escape_html(host);
    let token = escape_html(token);
    let ip_list = escape_html(ip_list);
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>TEXT2KV 配置信息</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; padding: 15px; max-width: 800px; margin: 0 auto; }}
        h1 {{ text-align: center; }}
        h2 {{ text-align: left; font-size: 1.3rem; }}
        pre, code {{ border-radius: 8px; overflow-x: auto; }}
        .tips {{ color: grey; font-size: 0.8em; border-left: 1px solid #666; padding-left: 10px; }}
        .container {{ padding: 5px 15px 15px 15px; border-radius: 10px; box-shadow: 0 0 10px rgba(0, 0, 0, 0.1); }}
    </style>
</head>
<body>
    <h1>TEXT2KV 配置信息</h1>
    <div class="container">
        <h2>更新脚本</h2>
        <p class="tips">Windows: <code>https://{host}/config/update.bat?token={token}</code></p>
        <p class="tips">Linux: <code>https://{host}/config/update.sh?token={token}</code></p>
        <p class="tips">直接写入: <code>https://{host}/ip.txt?token={token}&amp;text=...</code></p>
    </div>
    <div class="container">
        <h2>IP 地址列表</h2>
        <pre>{ip_list}</pre>
    </div>
</body>
</html>
"#
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
