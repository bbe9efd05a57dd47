//! Language names: aliases, grammar lookup fallbacks and heading icons.

/// Canonical language name for an alias (`cs` → `csharp`, `yml` → `yaml`).
///
/// Unknown names are lowercased and passed through.
pub fn normalize(lang: &str) -> String {
    let lower = lang.trim().to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "cs" | "c#" => "csharp",
        "yml" => "yaml",
        "ts" => "typescript",
        "js" | "mjs" | "cjs" => "javascript",
        "sh" | "shell" | "zsh" | "console" => "bash",
        "md" => "markdown",
        "rs" => "rust",
        "py" => "python",
        "htm" => "html",
        "ps1" | "pwsh" => "powershell",
        "docker" => "dockerfile",
        "jsonc" | "json5" => "json",
        "kt" => "kotlin",
        "rb" => "ruby",
        _ => return lower,
    };
    canonical.to_string()
}

/// Grammar token to try when the canonical name has no grammar of its own.
pub fn grammar_fallback(lang: &str) -> Option<&'static str> {
    Some(match lang {
        "typescript" | "tsx" | "jsx" => "js",
        "csharp" => "cs",
        "bash" => "sh",
        "scss" | "sass" | "less" => "css",
        "vue" | "svelte" | "angular" => "html",
        "rust" => "rs",
        "python" => "py",
        "markdown" => "md",
        _ => return None,
    })
}

/// Icon name shown in the code heading bar.
pub fn icon(lang: &str) -> &'static str {
    match lang {
        "typescript" | "tsx" => "typescript",
        "javascript" | "jsx" => "javascript",
        "html" | "vue" | "svelte" | "angular" => "html",
        "css" | "scss" | "sass" | "less" => "css",
        "json" => "json",
        "bash" | "powershell" => "terminal",
        "rust" => "rust",
        "python" => "python",
        "csharp" => "csharp",
        "yaml" => "yaml",
        "markdown" => "markdown",
        "dockerfile" => "docker",
        "sql" => "database",
        _ => "code",
    }
}
