//! Rebuild operations: the five things you can do to a gallery.
//!
//! Every operation runs the same fixed sequence of phases:
//!
//! ```text
//! Validate → Scan → Transform → Render → Persist
//! ```
//!
//! | Operation | Scan | Transform | Persist |
//! |---|---|---|---|
//! | [`Create`](Operation::Create) | list + rename | optimize + thumbnail | append record with a fresh id |
//! | [`RegeneratePhotos`](Operation::RegeneratePhotos) | list + rename | optimize | `lastModifiedAt`, `photoCount` |
//! | [`RegenerateThumbnails`](Operation::RegenerateThumbnails) | list + rename | recreate `thumbs/`, thumbnail | `lastModifiedAt`, `photoCount` |
//! | [`RegenerateHtml`](Operation::RegenerateHtml) | list | none | nothing |
//! | [`ChangeTemplate`](Operation::ChangeTemplate) | list | none | `template`, `lastModifiedAt` |
//!
//! Every operation renders the page.
//!
//! ## Failure model
//!
//! A failure in any phase stops the operation and is reported as a
//! [`RebuildError`] naming the operation and the phase. Validate never
//! touches the filesystem. The catalog is loaded once before Validate and
//! written only in Persist, so a failed operation never changes it.
//!
//! Renames made during Scan and files rewritten during Transform stay in
//! place when a later phase fails. Every step is idempotent: running the
//! same operation again converges.
//!
//! ## Concurrency
//!
//! Per-photo transforms run in parallel on the global rayon pool. Each task
//! writes only its own photo and its own thumbnail. Operations themselves
//! assume a single writer: two processes working on the same catalog at once
//! is not supported.

use crate::catalog::{Catalog, CatalogError, CatalogStore, GalleryRecord};
use crate::config::{Layout, OrcaConfig};
use crate::generate::{self, GenerateError, RenderRequest, resolve_template};
use crate::imaging::{
    BackendError, ImageBackend, OptimizeConfig, ThumbnailConfig, create_thumbnail, optimize_photo,
};
use crate::metadata::resolve_reference_date;
use crate::naming::folder_slug;
use crate::scan::{self, ScanError, THUMBS_DIR};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info};

/// The rebuild operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    RegeneratePhotos,
    RegenerateThumbnails,
    RegenerateHtml,
    ChangeTemplate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::RegeneratePhotos => "regenerate-photos",
            Operation::RegenerateThumbnails => "regenerate-thumbs",
            Operation::RegenerateHtml => "regenerate-html",
            Operation::ChangeTemplate => "change-template",
        })
    }
}

/// The phases every operation passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Validate,
    Scan,
    Transform,
    Render,
    Persist,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Validate,
        Phase::Scan,
        Phase::Transform,
        Phase::Render,
        Phase::Persist,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Validate => "validate",
            Phase::Scan => "scan",
            Phase::Transform => "transform",
            Phase::Render => "render",
            Phase::Persist => "persist",
        })
    }
}

/// What went wrong, independent of where.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("gallery {0} not found in catalog")]
    NotFound(String),
    #[error("template '{name}' not found (expected {})", .path.display())]
    TemplateNotFound { name: String, path: PathBuf },
    #[error("gallery folder {} does not exist", .0.display())]
    FolderMissing(PathBuf),
    #[error("no photos found in {}", .0.display())]
    EmptyGallery(PathBuf),
    #[error("folder '{folder}' already belongs to gallery {id}")]
    DuplicateGallery { folder: String, id: String },
    #[error("image {}: {source}", .path.display())]
    ImageCodec {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<GenerateError> for GalleryError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::TemplateNotFound { name, path } => {
                GalleryError::TemplateNotFound { name, path }
            }
            GenerateError::Image { path, source } => GalleryError::ImageCodec { path, source },
            GenerateError::Io { path, source } => GalleryError::Io { path, source },
        }
    }
}

/// A failed operation: which one, where it stopped, and why.
#[derive(Error, Debug)]
#[error("{operation} failed during {phase}: {source}")]
pub struct RebuildError {
    pub operation: Operation,
    pub phase: Phase,
    #[source]
    pub source: GalleryError,
}

/// A request for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create {
        title: String,
        template: Option<String>,
    },
    RegeneratePhotos {
        id: String,
    },
    RegenerateThumbnails {
        id: String,
    },
    RegenerateHtml {
        id: String,
    },
    ChangeTemplate {
        id: String,
        template: String,
    },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Create { .. } => Operation::Create,
            Request::RegeneratePhotos { .. } => Operation::RegeneratePhotos,
            Request::RegenerateThumbnails { .. } => Operation::RegenerateThumbnails,
            Request::RegenerateHtml { .. } => Operation::RegenerateHtml,
            Request::ChangeTemplate { .. } => Operation::ChangeTemplate,
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            Request::Create { .. } => None,
            Request::RegeneratePhotos { id }
            | Request::RegenerateThumbnails { id }
            | Request::RegenerateHtml { id }
            | Request::ChangeTemplate { id, .. } => Some(id),
        }
    }
}

/// Progress reported while an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildEvent {
    PhaseStarted {
        operation: Operation,
        phase: Phase,
    },
    PhotoRenamed {
        from: String,
        to: String,
    },
    PhotoOptimized {
        filename: String,
        width: u32,
        height: u32,
    },
    ThumbnailWritten {
        filename: String,
    },
    StylesheetMissing {
        template: String,
    },
    CatalogSaved {
        path: PathBuf,
    },
}

/// Result of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildOutcome {
    pub operation: Operation,
    /// The gallery's record as it stands after the operation.
    pub record: GalleryRecord,
    pub photos: usize,
    pub renamed: usize,
    pub page: PathBuf,
    pub stylesheet_copied: bool,
    pub catalog_saved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Thumbnails {
    Untouched,
    Fill,
    Recreate,
}

/// The per-operation rules of the state machine.
#[derive(Debug, Clone, Copy)]
struct Plan {
    /// Validate refuses a folder without photos.
    photos_required_upfront: bool,
    /// Scan renames to normalized filenames.
    normalize: bool,
    optimize: bool,
    thumbnails: Thumbnails,
    persist: bool,
}

impl Operation {
    fn plan(self) -> Plan {
        match self {
            Operation::Create => Plan {
                photos_required_upfront: true,
                normalize: true,
                optimize: true,
                thumbnails: Thumbnails::Fill,
                persist: true,
            },
            Operation::RegeneratePhotos => Plan {
                photos_required_upfront: false,
                normalize: true,
                optimize: true,
                thumbnails: Thumbnails::Untouched,
                persist: true,
            },
            Operation::RegenerateThumbnails => Plan {
                photos_required_upfront: false,
                normalize: true,
                optimize: false,
                thumbnails: Thumbnails::Recreate,
                persist: true,
            },
            Operation::RegenerateHtml => Plan {
                photos_required_upfront: true,
                normalize: false,
                optimize: false,
                thumbnails: Thumbnails::Untouched,
                persist: false,
            },
            Operation::ChangeTemplate => Plan {
                photos_required_upfront: true,
                normalize: false,
                optimize: false,
                thumbnails: Thumbnails::Untouched,
                persist: true,
            },
        }
    }
}

/// Output of Validate.
#[derive(Debug)]
struct Target {
    existing: Option<GalleryRecord>,
    folder_name: String,
    folder: PathBuf,
    title: String,
    template: String,
}

/// Output of Scan.
#[derive(Debug)]
struct Scanned {
    photos: Vec<PathBuf>,
    renamed: usize,
    reference_date: DateTime<Utc>,
}

/// Runs rebuild operations against one project.
pub struct Rebuilder<'a, B: ImageBackend> {
    backend: &'a B,
    layout: Layout,
    store: CatalogStore,
    optimize: OptimizeConfig,
    thumbnails: ThumbnailConfig,
    default_template: String,
    events: Option<Sender<RebuildEvent>>,
}

impl<'a, B: ImageBackend> Rebuilder<'a, B> {
    pub fn new(backend: &'a B, config: &OrcaConfig, root: &Path) -> Self {
        let layout = config.layout(root);
        Self {
            backend,
            store: CatalogStore::new(layout.catalog.clone()),
            layout,
            optimize: config.optimize_config(),
            thumbnails: config.thumbnail_config(),
            default_template: config.templates.default.clone(),
            events: None,
        }
    }

    /// Report progress on `events`.
    pub fn with_events(mut self, events: Sender<RebuildEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn create(
        &self,
        title: &str,
        template: Option<&str>,
    ) -> Result<RebuildOutcome, RebuildError> {
        self.execute(&Request::Create {
            title: title.to_string(),
            template: template.map(str::to_string),
        })
    }

    pub fn regenerate_photos(&self, id: &str) -> Result<RebuildOutcome, RebuildError> {
        self.execute(&Request::RegeneratePhotos { id: id.to_string() })
    }

    pub fn regenerate_thumbnails(&self, id: &str) -> Result<RebuildOutcome, RebuildError> {
        self.execute(&Request::RegenerateThumbnails { id: id.to_string() })
    }

    pub fn regenerate_html(&self, id: &str) -> Result<RebuildOutcome, RebuildError> {
        self.execute(&Request::RegenerateHtml { id: id.to_string() })
    }

    pub fn change_template(&self, id: &str, template: &str) -> Result<RebuildOutcome, RebuildError> {
        self.execute(&Request::ChangeTemplate {
            id: id.to_string(),
            template: template.to_string(),
        })
    }

    /// Run one operation through all five phases.
    pub fn execute(&self, request: &Request) -> Result<RebuildOutcome, RebuildError> {
        let operation = request.operation();
        let plan = operation.plan();
        let failed = |phase: Phase| {
            move |source: GalleryError| RebuildError {
                operation,
                phase,
                source,
            }
        };

        self.enter(operation, Phase::Validate);
        let mut catalog = self.store.load();
        let target = self
            .validate(request, &plan, &catalog)
            .map_err(failed(Phase::Validate))?;

        self.enter(operation, Phase::Scan);
        let scanned = self.scan(&plan, &target).map_err(failed(Phase::Scan))?;

        self.enter(operation, Phase::Transform);
        self.transform(&plan, &target.folder, &scanned.photos)
            .map_err(failed(Phase::Transform))?;

        self.enter(operation, Phase::Render);
        let rendered = self
            .render(&target, &scanned)
            .map_err(failed(Phase::Render))?;

        self.enter(operation, Phase::Persist);
        let record = self
            .persist(&plan, &mut catalog, target, &scanned)
            .map_err(failed(Phase::Persist))?;

        info!(
            operation = %operation,
            id = %record.id,
            photos = scanned.photos.len(),
            "operation complete"
        );
        Ok(RebuildOutcome {
            operation,
            record,
            photos: scanned.photos.len(),
            renamed: scanned.renamed,
            page: rendered.page,
            stylesheet_copied: rendered.stylesheet_copied,
            catalog_saved: plan.persist,
        })
    }

    fn emit(&self, event: RebuildEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }

    fn enter(&self, operation: Operation, phase: Phase) {
        debug!(operation = %operation, phase = %phase, "entering phase");
        self.emit(RebuildEvent::PhaseStarted { operation, phase });
    }

    // ------------------------------------------------------------------------
    // Validate: arguments, catalog and folder checks; no filesystem writes
    // ------------------------------------------------------------------------

    fn validate(
        &self,
        request: &Request,
        plan: &Plan,
        catalog: &Catalog,
    ) -> Result<Target, GalleryError> {
        let target = match request {
            Request::Create { title, template } => {
                let title = title.trim();
                let folder_name = folder_slug(title);
                if folder_name.is_empty() {
                    return Err(GalleryError::MissingArgument("title"));
                }
                if let Some(existing) = catalog.find_by_folder(&folder_name) {
                    return Err(GalleryError::DuplicateGallery {
                        folder: folder_name,
                        id: existing.id.clone(),
                    });
                }
                let template = template
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(self.default_template.as_str());
                Target {
                    existing: None,
                    folder: self.layout.photos_root.join(&folder_name),
                    folder_name,
                    title: title.to_string(),
                    template: template.to_string(),
                }
            }
            _ => {
                let id = request.id().map(str::trim).unwrap_or_default();
                if id.is_empty() {
                    return Err(GalleryError::MissingArgument("id"));
                }
                let record = catalog
                    .find(id)
                    .ok_or_else(|| GalleryError::NotFound(id.to_string()))?;
                let template = match request {
                    Request::ChangeTemplate { template, .. } => {
                        let template = template.trim();
                        if template.is_empty() {
                            return Err(GalleryError::MissingArgument("template"));
                        }
                        template.to_string()
                    }
                    _ => record.template.clone(),
                };
                Target {
                    folder: self.layout.photos_root.join(&record.folder),
                    folder_name: record.folder.clone(),
                    title: record.title.clone(),
                    template,
                    existing: Some(record.clone()),
                }
            }
        };

        if !target.folder.is_dir() {
            return Err(GalleryError::FolderMissing(target.folder));
        }
        resolve_template(&self.layout.templates_root, &target.template)?;
        if plan.photos_required_upfront && scan::list_photos(&target.folder)?.is_empty() {
            return Err(GalleryError::EmptyGallery(target.folder));
        }
        Ok(target)
    }

    // ------------------------------------------------------------------------
    // Scan: list photos, normalize names, pin the reference date
    // ------------------------------------------------------------------------

    fn scan(&self, plan: &Plan, target: &Target) -> Result<Scanned, GalleryError> {
        let (photos, renamed) = if plan.normalize {
            let outcome = scan::normalize_photos(&target.folder)?;
            for rename in &outcome.renames {
                self.emit(RebuildEvent::PhotoRenamed {
                    from: rename.from.clone(),
                    to: rename.to.clone(),
                });
            }
            (outcome.photos, outcome.renames.len())
        } else {
            (scan::list_photos(&target.folder)?, 0)
        };

        let Some(first) = photos.first() else {
            return Err(GalleryError::EmptyGallery(target.folder.clone()));
        };

        // Resolved before Transform: re-encoding drops EXIF.
        let reference_date = match &target.existing {
            Some(record) => record.reference_date,
            None => resolve_reference_date(self.backend, first),
        };

        Ok(Scanned {
            photos,
            renamed,
            reference_date,
        })
    }

    // ------------------------------------------------------------------------
    // Transform: per-photo image work, in parallel
    // ------------------------------------------------------------------------

    fn transform(&self, plan: &Plan, folder: &Path, photos: &[PathBuf]) -> Result<(), GalleryError> {
        let thumbs_dir = folder.join(THUMBS_DIR);
        let io_err = |source| GalleryError::Io {
            path: thumbs_dir.clone(),
            source,
        };
        match plan.thumbnails {
            Thumbnails::Untouched => {}
            Thumbnails::Fill => fs::create_dir_all(&thumbs_dir).map_err(io_err)?,
            Thumbnails::Recreate => {
                if thumbs_dir.exists() {
                    fs::remove_dir_all(&thumbs_dir).map_err(io_err)?;
                }
                fs::create_dir_all(&thumbs_dir).map_err(io_err)?;
            }
        }

        if !plan.optimize && plan.thumbnails == Thumbnails::Untouched {
            return Ok(());
        }
        photos
            .par_iter()
            .try_for_each(|photo| self.transform_photo(plan, photo, &thumbs_dir))
    }

    /// Optimize then thumbnail one photo. The thumbnail is taken from the
    /// optimized file.
    fn transform_photo(&self, plan: &Plan, photo: &Path, thumbs_dir: &Path) -> Result<(), GalleryError> {
        let codec_err = |source| GalleryError::ImageCodec {
            path: photo.to_path_buf(),
            source,
        };
        let filename = photo
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if plan.optimize {
            let (width, height) =
                optimize_photo(self.backend, photo, &self.optimize).map_err(codec_err)?;
            debug!(photo = %photo.display(), width, height, "optimized");
            self.emit(RebuildEvent::PhotoOptimized {
                filename: filename.clone(),
                width,
                height,
            });
        }
        if plan.thumbnails != Thumbnails::Untouched {
            create_thumbnail(self.backend, photo, thumbs_dir, &self.thumbnails)
                .map_err(codec_err)?;
            self.emit(RebuildEvent::ThumbnailWritten { filename });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Render
    // ------------------------------------------------------------------------

    fn render(
        &self,
        target: &Target,
        scanned: &Scanned,
    ) -> Result<generate::RenderOutcome, GalleryError> {
        let outcome = generate::render_gallery(
            self.backend,
            &RenderRequest {
                templates_root: &self.layout.templates_root,
                template: &target.template,
                folder: &target.folder,
                photos: &scanned.photos,
                title: &target.title,
                reference_date: &scanned.reference_date,
            },
        )?;
        if !outcome.stylesheet_copied {
            self.emit(RebuildEvent::StylesheetMissing {
                template: target.template.clone(),
            });
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------------
    // Persist: the only phase that writes the catalog
    // ------------------------------------------------------------------------

    fn persist(
        &self,
        plan: &Plan,
        catalog: &mut Catalog,
        target: Target,
        scanned: &Scanned,
    ) -> Result<GalleryRecord, GalleryError> {
        let now = Utc::now();
        let record = match target.existing {
            None => {
                let record = GalleryRecord {
                    id: catalog.next_id(),
                    folder: target.folder_name,
                    title: target.title,
                    created_at: now,
                    reference_date: scanned.reference_date,
                    last_modified_at: now,
                    photo_count: scanned.photos.len(),
                    template: target.template,
                };
                catalog.galleries.push(record.clone());
                record
            }
            Some(existing) if !plan.persist => existing,
            Some(existing) => {
                let record = catalog
                    .find_mut(&existing.id)
                    .ok_or_else(|| GalleryError::NotFound(existing.id.clone()))?;
                record.last_modified_at = now;
                if plan.normalize {
                    record.photo_count = scanned.photos.len();
                }
                record.template = target.template;
                record.clone()
            }
        };

        if plan.persist {
            self.store.save(catalog)?;
            self.emit(RebuildEvent::CatalogSaved {
                path: self.store.path().to_path_buf(),
            });
        }
        Ok(record)
    }
}

/// Lay out a fresh project: the photos root plus the stock template under
/// the configured default name. Existing files are kept.
///
/// Returns what was created.
pub fn init_project(config: &OrcaConfig, root: &Path) -> Result<Vec<PathBuf>, GalleryError> {
    let layout = config.layout(root);
    let mut created = Vec::new();
    if !layout.photos_root.is_dir() {
        fs::create_dir_all(&layout.photos_root).map_err(|source| GalleryError::Io {
            path: layout.photos_root.clone(),
            source,
        })?;
        created.push(layout.photos_root.clone());
    }
    created.extend(generate::install_stock_template(
        &layout.templates_root,
        &config.templates.default,
    )?);
    Ok(created)
}
