#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "Dark",
            ThemeMode::Light => "Light",
        }
    }
}

pub fn theme_css(mode: ThemeMode) -> &'static str {
    match mode {
        ThemeMode::Dark => DARK_THEME,
        ThemeMode::Light => LIGHT_THEME,
    }
}

const DARK_THEME: &str = r#"
:root {
    --color-bg-primary: #0b0b0f;
    --color-bg-card: #17171d;
    --color-bg-header: #22222b;
    --color-text-primary: #f4f4f5;
    --color-text-muted: #a1a1aa;
    --color-border: #2e2e38;
    --color-bubble-human: #f97316;
    --color-bubble-human-text: #0b0b0f;
    --color-bubble-agent: #2e2e38;
    --color-bubble-agent-text: #f4f4f5;
    --color-danger: #ef4444;
}
"#;

const LIGHT_THEME: &str = r#"
:root {
    --color-bg-primary: #fafafa;
    --color-bg-card: #ffffff;
    --color-bg-header: #ececf0;
    --color-text-primary: #18181b;
    --color-text-muted: #52525b;
    --color-border: #d4d4d8;
    --color-bubble-human: #fdba74;
    --color-bubble-human-text: #18181b;
    --color-bubble-agent: #e4e4e7;
    --color-bubble-agent-text: #18181b;
    --color-danger: #dc2626;
}
"#;
