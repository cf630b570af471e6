//! The stateful ticket widget: form state, validation bookkeeping, avatar sequencing and
//! the repaint-on-every-mutation contract.

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::avatar::{
    AvatarImage, AvatarRejection, AvatarUpload, check_avatar_upload, decode_avatar,
};
use crate::compile::layout::TicketLayout;
use crate::compile::plan::TicketPlan;
use crate::config::settings::TicketSettings;
use crate::export::png::{ExportedTicket, encode_png, export_file_name};
use crate::foundation::error::{TicketError, TicketResult};
use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
use crate::render::pipeline::{RenderedTicket, render_ticket};
use crate::ticket::number::generate_ticket_number;
use crate::ticket::state::TicketState;
use crate::validation::feedback::{Feedback, FieldError, present};
use crate::validation::policy::{DisplayMode, Field, GithubPolicy, NamePolicy, ValidationConfig};
use crate::validation::rules::{FieldValidationResult, validate};

/// Lifecycle of one interaction with the widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetPhase {
    /// Nothing touched yet.
    Empty,
    Editing,
    /// The last blurred field failed.
    Invalid,
    /// All three fields currently pass.
    Valid,
    /// Terminal until [`TicketWidget::reset`].
    Submitted,
}

/// Receipt for an accepted upload. Only the most recently issued token can apply its image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadToken {
    seq: u64,
}

impl UploadToken {
    pub fn seq(self) -> u64 {
        self.seq
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvatarOutcome {
    Applied,
    /// A newer upload was started after this one; nothing changed.
    Stale,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted {
        ticket_number: String,
    },
    Rejected {
        errors: Vec<FieldError>,
        feedback: Vec<Feedback>,
        focus: Field,
    },
    AlreadySubmitted,
}

/// Owns the ticket state and keeps the rendered frame in sync with it.
///
/// Every mutation that changes what the ticket shows is followed by exactly one full
/// repaint, so [`TicketWidget::frame`] never lags behind [`TicketWidget::state`].
pub struct TicketWidget {
    backend: Box<dyn RenderBackend>,
    layout: TicketLayout,
    config: ValidationConfig,
    rng: StdRng,
    state: TicketState,
    phase: WidgetPhase,
    errors: HashMap<Field, String>,
    touched: HashSet<Field>,
    feedback: Vec<Feedback>,
    focus: Option<Field>,
    rendered: RenderedTicket,
    upload_seq: u64,
    confirmation_visible: bool,
    export_enabled: bool,
}

impl std::fmt::Debug for TicketWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketWidget")
            .field("phase", &self.phase)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("upload_seq", &self.upload_seq)
            .finish_non_exhaustive()
    }
}

impl TicketWidget {
    /// Build a widget on the CPU backend described by `settings`.
    pub fn from_settings(settings: &TicketSettings) -> TicketResult<Self> {
        settings.validate()?;
        let backend = create_backend(BackendKind::Cpu, &settings.render_settings())?;
        Self::with_backend(backend, settings)
    }

    /// Build a widget on an explicit backend and paint the empty ticket.
    pub fn with_backend(
        mut backend: Box<dyn RenderBackend>,
        settings: &TicketSettings,
    ) -> TicketResult<Self> {
        let layout = settings.layout();
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let state = TicketState::default();
        let rendered = render_ticket(backend.as_mut(), &state, &layout, &mut rng)?;
        Ok(Self {
            backend,
            layout,
            config: settings.validation,
            rng,
            state,
            phase: WidgetPhase::Empty,
            errors: HashMap::new(),
            touched: HashSet::new(),
            feedback: Vec::new(),
            focus: None,
            rendered,
            upload_seq: 0,
            confirmation_visible: false,
            export_enabled: false,
        })
    }

    pub fn phase(&self) -> WidgetPhase {
        self.phase
    }

    pub fn state(&self) -> &TicketState {
        &self.state
    }

    pub fn config(&self) -> ValidationConfig {
        self.config
    }

    pub fn layout(&self) -> &TicketLayout {
        &self.layout
    }

    /// The most recent frame; always reflects the current state.
    pub fn frame(&self) -> &FrameRGBA {
        &self.rendered.frame
    }

    pub fn plan(&self) -> &TicketPlan {
        &self.rendered.plan
    }

    /// Field that should hold input focus after a rejected submit.
    pub fn focus(&self) -> Option<Field> {
        self.focus
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Recorded errors in fixed field order.
    pub fn errors(&self) -> Vec<FieldError> {
        Field::ALL
            .iter()
            .filter_map(|&field| {
                self.errors.get(&field).map(|message| FieldError {
                    field,
                    message: message.clone(),
                })
            })
            .collect()
    }

    /// Feedback from the last rejected submit, shaped by the display mode at that time.
    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    pub fn confirmation_visible(&self) -> bool {
        self.confirmation_visible
    }

    pub fn export_enabled(&self) -> bool {
        self.export_enabled
    }

    /// Store a raw field value and repaint.
    pub fn set_field(&mut self, field: Field, raw: impl Into<String>) -> TicketResult<()> {
        self.ensure_editable("edit a field")?;
        let raw = raw.into();
        self.commit(|state| state.set_field(field, raw))?;
        self.phase = WidgetPhase::Editing;
        Ok(())
    }

    /// Validate one field as it loses focus.
    pub fn blur(&mut self, field: Field) -> TicketResult<FieldValidationResult> {
        self.ensure_editable("validate a field")?;
        self.touched.insert(field);
        let result = validate(field, self.state.field(field), &self.config);
        self.record(field, &result);

        if let Some(normalized) = &result.normalized_value
            && normalized != self.state.field(field)
        {
            let normalized = normalized.clone();
            self.commit(|state| state.set_field(field, normalized))?;
        }

        self.phase = if !result.is_valid {
            WidgetPhase::Invalid
        } else if self.all_fields_valid() {
            WidgetPhase::Valid
        } else {
            WidgetPhase::Editing
        };
        Ok(result)
    }

    /// Re-run validation on every field that has been blurred, e.g. after a policy change.
    pub fn revalidate_touched(&mut self) -> TicketResult<Vec<(Field, FieldValidationResult)>> {
        let fields: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|f| self.touched.contains(f))
            .collect();
        let mut results = Vec::with_capacity(fields.len());
        for field in fields {
            results.push((field, self.blur(field)?));
        }
        Ok(results)
    }

    pub fn set_name_validation(&mut self, policy: NamePolicy) {
        self.config.name_validation = policy;
    }

    pub fn set_github_validation(&mut self, policy: GithubPolicy) {
        self.config.github_validation = policy;
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.config.display_mode = mode;
    }

    /// Check an upload's metadata and reserve the next sequence number for it.
    pub fn begin_avatar_upload(&mut self, upload: &AvatarUpload) -> TicketResult<UploadToken> {
        self.ensure_editable("change the avatar")?;
        if let Err(rejection) = check_avatar_upload(upload) {
            tracing::debug!(mime = %upload.mime, len = upload.len, %rejection, "avatar rejected");
            return Err(rejection.into());
        }
        self.upload_seq += 1;
        Ok(UploadToken {
            seq: self.upload_seq,
        })
    }

    /// Apply a decoded avatar if `token` is still the latest upload.
    ///
    /// A decode failure from the latest upload, or an image the backend cannot paint, is
    /// returned as an error and leaves the previous avatar in place.
    pub fn complete_avatar_upload(
        &mut self,
        token: UploadToken,
        decoded: Result<AvatarImage, AvatarRejection>,
    ) -> TicketResult<AvatarOutcome> {
        if token.seq != self.upload_seq {
            tracing::debug!(
                seq = token.seq,
                latest = self.upload_seq,
                "discarding stale avatar"
            );
            return Ok(AvatarOutcome::Stale);
        }
        self.ensure_editable("change the avatar")?;
        let image = decoded.inspect_err(|rejection| {
            tracing::debug!(seq = token.seq, %rejection, "avatar rejected");
        })?;
        self.commit(|state| state.avatar = Some(image))
            .inspect_err(|e| {
                tracing::warn!(seq = token.seq, error = %e, "avatar could not be painted");
            })?;
        if self.phase == WidgetPhase::Empty {
            self.phase = WidgetPhase::Editing;
        }
        Ok(AvatarOutcome::Applied)
    }

    /// Check, decode and apply an avatar in one step.
    pub fn load_avatar(&mut self, mime: &str, bytes: &[u8]) -> TicketResult<AvatarOutcome> {
        let upload = AvatarUpload::new(mime, bytes.len() as u64);
        let token = self.begin_avatar_upload(&upload)?;
        self.complete_avatar_upload(token, decode_avatar(bytes))
    }

    /// Validate all fields together and, when they pass, freeze the ticket.
    #[tracing::instrument(skip_all, fields(phase = ?self.phase))]
    pub fn submit(&mut self) -> TicketResult<SubmitOutcome> {
        if self.phase == WidgetPhase::Submitted {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }

        let results: Vec<(Field, FieldValidationResult)> = Field::ALL
            .into_iter()
            .map(|field| (field, validate(field, self.state.field(field), &self.config)))
            .collect();
        for (field, result) in &results {
            self.touched.insert(*field);
            self.record(*field, result);
        }

        let errors: Vec<FieldError> = results
            .iter()
            .filter(|(_, r)| !r.is_valid)
            .map(|(field, r)| FieldError {
                field: *field,
                message: r.message.clone(),
            })
            .collect();

        if let Some(first) = errors.first() {
            let focus = first.field;
            self.phase = WidgetPhase::Editing;
            self.focus = Some(focus);
            self.feedback = present(&errors, self.config.display_mode);
            tracing::info!(invalid = errors.len(), %focus, "submit rejected");
            return Ok(SubmitOutcome::Rejected {
                errors,
                feedback: self.feedback.clone(),
                focus,
            });
        }

        let ticket_number = match self.rendered.plan.ticket_number.clone() {
            Some(shown) => shown,
            None => generate_ticket_number(&self.state.full_name, &mut self.rng),
        };
        let frozen = ticket_number.clone();
        self.commit(|state| {
            for (field, result) in results {
                if let Some(normalized) = result.normalized_value {
                    state.set_field(field, normalized);
                }
            }
            state.ticket_number = Some(frozen);
        })?;
        self.phase = WidgetPhase::Submitted;
        self.focus = None;
        self.feedback.clear();
        self.confirmation_visible = true;
        self.export_enabled = true;
        tracing::info!(%ticket_number, "ticket submitted");
        Ok(SubmitOutcome::Accepted { ticket_number })
    }

    /// Encode the current frame for download.
    pub fn export_png(&self) -> TicketResult<ExportedTicket> {
        if !self.export_enabled {
            return Err(TicketError::state(
                "export is only available after a successful submit",
            ));
        }
        let bytes = encode_png(&self.rendered.frame)?;
        Ok(ExportedTicket {
            file_name: export_file_name(&self.state.full_name),
            bytes,
        })
    }

    /// Start a new interaction. Uploads begun before the reset become stale.
    pub fn reset(&mut self) -> TicketResult<()> {
        self.upload_seq += 1;
        self.commit(|state| *state = TicketState::default())?;
        self.phase = WidgetPhase::Empty;
        self.errors.clear();
        self.touched.clear();
        self.feedback.clear();
        self.focus = None;
        self.confirmation_visible = false;
        self.export_enabled = false;
        Ok(())
    }

    fn ensure_editable(&self, action: &str) -> TicketResult<()> {
        if self.phase == WidgetPhase::Submitted {
            return Err(TicketError::state(format!(
                "cannot {action} after the ticket was submitted"
            )));
        }
        Ok(())
    }

    fn record(&mut self, field: Field, result: &FieldValidationResult) {
        if result.is_valid {
            self.errors.remove(&field);
        } else {
            self.errors.insert(field, result.message.clone());
        }
    }

    fn all_fields_valid(&self) -> bool {
        Field::ALL
            .into_iter()
            .all(|field| validate(field, self.state.field(field), &self.config).is_valid)
    }

    /// Apply `mutate` and repaint. If the repaint fails the state is rolled back, so the
    /// current frame keeps matching it.
    fn commit(&mut self, mutate: impl FnOnce(&mut TicketState)) -> TicketResult<()> {
        let previous = self.state.clone();
        mutate(&mut self.state);
        if let Err(e) = self.repaint() {
            self.state = previous;
            return Err(e);
        }
        Ok(())
    }

    fn repaint(&mut self) -> TicketResult<()> {
        self.rendered = render_ticket(
            self.backend.as_mut(),
            &self.state,
            &self.layout,
            &mut self.rng,
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widget/session.rs"]
mod tests;
