//! Theme engine
//!
//! Template rendering using Tera. Templates are `.html` files loaded
//! from the active theme directory at startup; `render` takes a
//! template name and a context and returns markup.

use std::fs;
use std::path::{Path, PathBuf};

use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Theme engine for rendering templates
#[derive(Debug)]
pub struct ThemeEngine {
    tera: Tera,
    theme_name: String,
}

impl ThemeEngine {
    /// Load all templates of the given theme.
    pub fn new(themes_path: &Path, theme_name: &str) -> Result<Self, ThemeError> {
        let theme_path = themes_path.join(theme_name);
        if !theme_path.is_dir() {
            return Err(ThemeError::NotFound(theme_name.to_string()));
        }

        let mut templates: Vec<(String, String)> = Vec::new();
        collect_templates(&theme_path, &theme_path, &mut templates)?;

        // Base templates first so children can extend them
        templates.sort_by(|a, b| {
            let a_is_base = a.0 == "base.html" || a.0.ends_with("/base.html");
            let b_is_base = b.0 == "base.html" || b.0.ends_with("/base.html");
            b_is_base.cmp(&a_is_base)
        });

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| ThemeError::TemplateError(e.to_string()))?;

        Ok(Self {
            tera,
            theme_name: theme_name.to_string(),
        })
    }

    /// Render a template with the given context.
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, ThemeError> {
        self.tera
            .render(template, context)
            .map_err(|e| ThemeError::TemplateError(format!("{}: {:?}", template, e)))
    }

    /// Name of the loaded theme.
    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }
}

/// Recursively collect `.html` templates, named relative to the theme root.
fn collect_templates(
    root: &Path,
    dir: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<(), ThemeError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path: PathBuf = entry.path();

        if path.is_dir() {
            collect_templates(root, &path, templates)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let name = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            let content = fs::read_to_string(&path)?;
            templates.push((name, content));
        }
    }
    Ok(())
}
