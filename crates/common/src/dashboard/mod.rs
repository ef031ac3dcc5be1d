//! Analysis dashboard catalog
//!
//! The charts are produced offline; this module only knows where each one
//! lives under the artifacts root and the narrative shown around it.

mod catalog;

pub use catalog::SECTIONS;

use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// URL prefix under which artifact files are served
pub const ARTIFACTS_URL_PREFIX: &str = "/artifacts";

/// One dashboard section with its sidebar anchor
#[derive(Debug)]
pub struct Section {
    pub anchor: &'static str,
    pub title: &'static str,
    /// Introductory paragraphs
    pub summary: &'static [&'static str],
    /// Bolded topic and its explanation
    pub topics: &'static [(&'static str, &'static str)],
    pub charts: &'static [Chart],
}

#[derive(Debug)]
pub struct Chart {
    pub title: &'static str,
    pub description: &'static str,
    /// Shown in the expandable "What does this data reveal?" block
    pub insight: &'static str,
    pub artifact: Artifact,
}

#[derive(Debug)]
pub enum Artifact {
    /// Self-contained HTML fragment, relative to the artifacts root
    Html(&'static str),
    /// Two captioned images side by side
    ImagePair([Figure; 2]),
}

#[derive(Debug)]
pub struct Figure {
    pub caption: &'static str,
    pub path: &'static str,
}

/// Dashboard section ready for a template
#[derive(Debug, Clone, Serialize)]
pub struct RenderedSection {
    pub anchor: &'static str,
    pub title: &'static str,
    pub summary: &'static [&'static str],
    pub topics: Vec<Topic>,
    pub charts: Vec<RenderedChart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub name: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedChart {
    pub title: &'static str,
    pub description: &'static str,
    pub insight: &'static str,
    pub body: RenderedArtifact,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedArtifact {
    /// `content` is `None` when the file is missing
    Html {
        path: &'static str,
        content: Option<String>,
    },
    Images { figures: Vec<RenderedFigure> },
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedFigure {
    pub caption: &'static str,
    pub src: String,
    pub available: bool,
}

/// Read-only access to the pre-rendered chart files
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of an artifact, refusing anything that escapes the root
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe || relative.as_os_str().is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Contents of an HTML artifact, `None` when missing or unreadable
    pub async fn read_html(&self, relative: &str) -> Option<String> {
        let path = self.resolve(relative)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Dashboard artifact unavailable");
                None
            }
        }
    }

    async fn exists(&self, relative: &str) -> bool {
        match self.resolve(relative) {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Materialize every section, reading HTML fragments from disk
    pub async fn render(&self, sections: &'static [Section]) -> Vec<RenderedSection> {
        let mut rendered = Vec::with_capacity(sections.len());
        for section in sections {
            let mut charts = Vec::with_capacity(section.charts.len());
            for chart in section.charts {
                charts.push(RenderedChart {
                    title: chart.title,
                    description: chart.description,
                    insight: chart.insight,
                    body: self.render_artifact(&chart.artifact).await,
                });
            }
            rendered.push(RenderedSection {
                anchor: section.anchor,
                title: section.title,
                summary: section.summary,
                topics: section
                    .topics
                    .iter()
                    .map(|&(name, text)| Topic { name, text })
                    .collect(),
                charts,
            });
        }
        rendered
    }

    async fn render_artifact(&self, artifact: &Artifact) -> RenderedArtifact {
        match artifact {
            Artifact::Html(path) => RenderedArtifact::Html {
                path: *path,
                content: self.read_html(path).await,
            },
            Artifact::ImagePair(figures) => {
                let mut rendered = Vec::with_capacity(figures.len());
                for figure in figures {
                    let available = self.exists(figure.path).await;
                    if !available {
                        warn!(path = figure.path, "Dashboard image unavailable");
                    }
                    rendered.push(RenderedFigure {
                        caption: figure.caption,
                        src: format!("{}/{}", ARTIFACTS_URL_PREFIX, figure.path),
                        available,
                    });
                }
                RenderedArtifact::Images { figures: rendered }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let anchors: Vec<&str> = SECTIONS.iter().map(|s| s.anchor).collect();
        assert_eq!(
            anchors,
            vec![
                "description",
                "time-patterns",
                "community-spread",
                "user-engagement",
                "author-behavior",
                "content-analysis"
            ]
        );
        let charts: usize = SECTIONS.iter().map(|s| s.charts.len()).sum();
        assert_eq!(charts, 13);
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let store = ArtifactStore::new("plots");
        assert_eq!(
            store.resolve("info_spread/daily_posting_trends.html"),
            Some(PathBuf::from("plots/info_spread/daily_posting_trends.html"))
        );
        assert_eq!(store.resolve("../secrets.env"), None);
        assert_eq!(store.resolve("/etc/passwd"), None);
        assert_eq!(store.resolve(""), None);
    }

    #[tokio::test]
    async fn test_render_with_partial_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("info_spread");
        std::fs::create_dir_all(&html).unwrap();
        std::fs::write(html.join("daily_posting_trends.html"), "<div>chart</div>").unwrap();

        let store = ArtifactStore::new(dir.path());
        let sections = store.render(SECTIONS).await;
        assert_eq!(sections.len(), 6);

        let time = &sections[1];
        match &time.charts[0].body {
            RenderedArtifact::Html { content, .. } => assert_eq!(content.as_deref(), Some("<div>chart</div>")),
            other => panic!("unexpected {:?}", other),
        }
        match &time.charts[1].body {
            RenderedArtifact::Html { content, .. } => assert!(content.is_none()),
            other => panic!("unexpected {:?}", other),
        }

        let words = sections[5].charts.last().unwrap();
        match &words.body {
            RenderedArtifact::Images { figures } => {
                assert_eq!(figures.len(), 2);
                assert!(figures.iter().all(|f| !f.available));
                assert!(figures[0].src.starts_with("/artifacts/"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
