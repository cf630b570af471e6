use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::assets::decode::PreparedImage;
use crate::compile::plan::TextRole;

/// Records how often it was asked to paint and returns a 1x1 frame.
struct CountingBackend {
    renders: Rc<Cell<usize>>,
}

impl RenderBackend for CountingBackend {
    fn render_plan(&mut self, _plan: &TicketPlan) -> TicketResult<FrameRGBA> {
        self.renders.set(self.renders.get() + 1);
        Ok(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
            premultiplied: true,
        })
    }
}

fn widget_with(settings: TicketSettings) -> (TicketWidget, Rc<Cell<usize>>) {
    let renders = Rc::new(Cell::new(0));
    let backend = Box::new(CountingBackend {
        renders: renders.clone(),
    });
    let widget = TicketWidget::with_backend(backend, &settings).unwrap();
    (widget, renders)
}

fn widget() -> (TicketWidget, Rc<Cell<usize>>) {
    widget_with(TicketSettings {
        seed: Some(11),
        ..TicketSettings::default()
    })
}

fn fill_valid(w: &mut TicketWidget) {
    w.set_field(Field::FullName, "Ada Lovelace").unwrap();
    w.set_field(Field::Email, "ada@example.com").unwrap();
    w.set_field(Field::GithubUsername, "ada").unwrap();
}

fn avatar() -> AvatarImage {
    Arc::new(PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(vec![255; 16]),
    })
}

#[test]
fn starts_empty_with_one_paint() {
    let (w, renders) = widget();
    assert_eq!(w.phase(), WidgetPhase::Empty);
    assert_eq!(renders.get(), 1);
    assert!(!w.state().has_data());
    assert!(w.plan().text(TextRole::EmptyPlaceholder).is_some());
    assert!(!w.confirmation_visible());
    assert!(!w.export_enabled());
}

#[test]
fn every_edit_repaints_once() {
    let (mut w, renders) = widget();
    w.set_field(Field::FullName, "Ada").unwrap();
    assert_eq!(w.phase(), WidgetPhase::Editing);
    assert_eq!(renders.get(), 2);
    assert_eq!(w.plan().text(TextRole::Name), Some("Ada"));

    w.set_field(Field::GithubUsername, "ada").unwrap();
    assert_eq!(renders.get(), 3);
    assert_eq!(w.plan().text(TextRole::Handle), Some("@ada"));
}

#[test]
fn blur_records_and_clears_errors() {
    let (mut w, _) = widget();
    w.set_field(Field::Email, "nope").unwrap();
    let r = w.blur(Field::Email).unwrap();
    assert!(!r.is_valid);
    assert_eq!(w.phase(), WidgetPhase::Invalid);
    assert_eq!(w.error(Field::Email), Some("Please enter a valid email address"));

    w.set_field(Field::Email, "ada@example.com").unwrap();
    assert!(w.blur(Field::Email).unwrap().is_valid);
    assert_eq!(w.error(Field::Email), None);
    // Other fields are still empty, so the form as a whole is not valid yet.
    assert_eq!(w.phase(), WidgetPhase::Editing);
}

#[test]
fn blur_does_not_touch_other_fields() {
    let (mut w, _) = widget();
    w.set_field(Field::FullName, "Ada").unwrap();
    w.blur(Field::FullName).unwrap();
    assert!(w.error(Field::FullName).is_some());
    assert_eq!(w.error(Field::Email), None);
    assert_eq!(w.errors().len(), 1);
}

#[test]
fn blur_reaches_valid_when_all_fields_pass() {
    let (mut w, _) = widget();
    fill_valid(&mut w);
    w.blur(Field::GithubUsername).unwrap();
    assert_eq!(w.phase(), WidgetPhase::Valid);
}

#[test]
fn no_at_blur_rewrites_value_and_repaints() {
    let (mut w, renders) = widget_with(TicketSettings {
        validation: ValidationConfig {
            github_validation: GithubPolicy::NoAt,
            ..ValidationConfig::default()
        },
        ..TicketSettings::default()
    });
    w.set_field(Field::GithubUsername, "@ada").unwrap();
    let before = renders.get();
    let r = w.blur(Field::GithubUsername).unwrap();
    assert_eq!(r.normalized_value.as_deref(), Some("ada"));
    assert_eq!(w.state().github_username, "ada");
    assert_eq!(renders.get(), before + 1);

    // Already normalized: nothing to rewrite, no extra paint.
    w.blur(Field::GithubUsername).unwrap();
    assert_eq!(renders.get(), before + 1);
}

#[test]
fn policy_setters_wait_for_explicit_revalidation() {
    let (mut w, _) = widget();
    w.set_field(Field::FullName, "Ada").unwrap();
    w.blur(Field::FullName).unwrap();
    assert!(w.error(Field::FullName).is_some());

    w.set_name_validation(NamePolicy::First);
    w.set_display_mode(DisplayMode::Toast);
    assert!(w.error(Field::FullName).is_some());

    let results = w.revalidate_touched().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, Field::FullName);
    assert!(results[0].1.is_valid);
    assert_eq!(w.error(Field::FullName), None);
    assert_eq!(w.config().display_mode, DisplayMode::Toast);
}

#[test]
fn rejected_submit_focuses_first_invalid_field() {
    let (mut w, _) = widget();
    w.set_field(Field::FullName, "Ada Lovelace").unwrap();
    w.set_field(Field::Email, "not-an-email").unwrap();

    let SubmitOutcome::Rejected {
        errors,
        feedback,
        focus,
    } = w.submit().unwrap()
    else {
        panic!("expected rejection");
    };
    assert_eq!(focus, Field::Email);
    assert_eq!(w.focus(), Some(Field::Email));
    assert_eq!(
        errors.iter().map(|e| e.field).collect::<Vec<_>>(),
        vec![Field::Email, Field::GithubUsername]
    );
    assert_eq!(feedback.len(), 2);
    assert!(matches!(feedback[0], Feedback::Inline { field: Field::Email, .. }));
    assert_eq!(w.phase(), WidgetPhase::Editing);
    assert!(!w.confirmation_visible());
    assert!(!w.export_enabled());
    assert!(w.export_png().is_err());
}

#[test]
fn alert_mode_collapses_feedback() {
    let (mut w, _) = widget();
    w.set_display_mode(DisplayMode::Alert);
    let SubmitOutcome::Rejected { feedback, focus, .. } = w.submit().unwrap() else {
        panic!("expected rejection");
    };
    assert_eq!(focus, Field::FullName);
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0].message().lines().count(), 3);
    assert_eq!(w.feedback(), feedback.as_slice());
}

#[test]
fn accepted_submit_freezes_number_and_enables_export_once() {
    let (mut w, renders) = widget();
    fill_valid(&mut w);
    let shown = w.plan().ticket_number.clone().unwrap();

    let before = renders.get();
    let SubmitOutcome::Accepted { ticket_number } = w.submit().unwrap() else {
        panic!("expected acceptance");
    };
    assert_eq!(ticket_number, shown);
    assert!(ticket_number.starts_with("AL"));
    assert_eq!(w.state().ticket_number.as_deref(), Some(shown.as_str()));
    assert_eq!(w.plan().ticket_number.as_deref(), Some(shown.as_str()));
    assert_eq!(renders.get(), before + 1);
    assert_eq!(w.phase(), WidgetPhase::Submitted);
    assert!(w.confirmation_visible());
    assert!(w.export_enabled());
    assert_eq!(w.focus(), None);

    assert_eq!(w.submit().unwrap(), SubmitOutcome::AlreadySubmitted);
    assert_eq!(renders.get(), before + 1);
}

#[test]
fn submitted_widget_refuses_edits() {
    let (mut w, _) = widget();
    fill_valid(&mut w);
    w.submit().unwrap();

    let err = w.set_field(Field::FullName, "Grace").unwrap_err();
    assert!(matches!(err, TicketError::State(_)));
    assert_eq!(w.state().full_name, "Ada Lovelace");
    assert!(w.begin_avatar_upload(&AvatarUpload::new("image/png", 10)).is_err());
}

#[test]
fn export_uses_full_name_in_file_name() {
    let (mut w, _) = widget();
    fill_valid(&mut w);
    w.submit().unwrap();
    let exported = w.export_png().unwrap();
    assert_eq!(exported.file_name, "conference-ticket-Ada_Lovelace.png");
    assert!(exported.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn latest_upload_wins() {
    let (mut w, renders) = widget();
    let first = w
        .begin_avatar_upload(&AvatarUpload::new("image/png", 100))
        .unwrap();
    let second = w
        .begin_avatar_upload(&AvatarUpload::new("image/jpeg", 100))
        .unwrap();
    assert!(second.seq() > first.seq());

    let before = renders.get();
    assert_eq!(
        w.complete_avatar_upload(first, Ok(avatar())).unwrap(),
        AvatarOutcome::Stale
    );
    assert!(w.state().avatar.is_none());
    assert_eq!(renders.get(), before);

    assert_eq!(
        w.complete_avatar_upload(second, Ok(avatar())).unwrap(),
        AvatarOutcome::Applied
    );
    assert!(w.state().avatar.is_some());
    assert!(w.plan().has_avatar_image());
    assert_eq!(renders.get(), before + 1);
    assert_eq!(w.phase(), WidgetPhase::Editing);
}

#[test]
fn rejected_upload_keeps_previous_avatar() {
    let (mut w, renders) = widget();
    let token = w
        .begin_avatar_upload(&AvatarUpload::new("image/png", 100))
        .unwrap();
    w.complete_avatar_upload(token, Ok(avatar())).unwrap();
    let before = renders.get();

    let err = w
        .begin_avatar_upload(&AvatarUpload::new("image/gif", 100))
        .unwrap_err();
    assert!(matches!(
        err,
        TicketError::Avatar(AvatarRejection::UnsupportedType { .. })
    ));
    let err = w
        .begin_avatar_upload(&AvatarUpload::new("image/png", 600 * 1024))
        .unwrap_err();
    assert!(matches!(err, TicketError::Avatar(AvatarRejection::TooLarge { .. })));

    let token = w
        .begin_avatar_upload(&AvatarUpload::new("image/png", 100))
        .unwrap();
    let err = w
        .complete_avatar_upload(token, Err(AvatarRejection::Decode("bad".into())))
        .unwrap_err();
    assert!(matches!(err, TicketError::Avatar(AvatarRejection::Decode(_))));

    assert!(w.state().avatar.is_some());
    assert_eq!(renders.get(), before);
}

#[test]
fn load_avatar_rejects_garbage_bytes() {
    let (mut w, _) = widget();
    let err = w.load_avatar("image/png", b"not a png").unwrap_err();
    assert!(matches!(err, TicketError::Avatar(AvatarRejection::Decode(_))));
    assert!(w.state().avatar.is_none());
}

#[test]
fn reset_clears_everything_and_staleness_survives() {
    let (mut w, _) = widget();
    let pending = w
        .begin_avatar_upload(&AvatarUpload::new("image/png", 100))
        .unwrap();
    fill_valid(&mut w);
    w.submit().unwrap();

    w.reset().unwrap();
    assert_eq!(w.phase(), WidgetPhase::Empty);
    assert_eq!(*w.state(), TicketState::default());
    assert!(w.errors().is_empty());
    assert!(!w.confirmation_visible());
    assert!(!w.export_enabled());
    assert!(w.plan().text(TextRole::EmptyPlaceholder).is_some());

    assert_eq!(
        w.complete_avatar_upload(pending, Ok(avatar())).unwrap(),
        AvatarOutcome::Stale
    );
    assert!(w.state().avatar.is_none());
}

#[test]
fn seeded_widgets_draw_the_same_numbers() {
    let (mut a, _) = widget();
    let (mut b, _) = widget();
    a.set_field(Field::FullName, "Ada Lovelace").unwrap();
    b.set_field(Field::FullName, "Ada Lovelace").unwrap();
    assert_eq!(a.plan().ticket_number, b.plan().ticket_number);
}

/// Paints like [`CountingBackend`] but refuses any plan that carries an avatar image.
struct AvatarRefusingBackend;

impl RenderBackend for AvatarRefusingBackend {
    fn render_plan(&mut self, plan: &TicketPlan) -> TicketResult<FrameRGBA> {
        if plan.has_avatar_image() {
            return Err(TicketError::render("avatar cannot be painted"));
        }
        Ok(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
            premultiplied: true,
        })
    }
}

#[test]
fn unpaintable_avatar_is_rolled_back() {
    let mut w =
        TicketWidget::with_backend(Box::new(AvatarRefusingBackend), &TicketSettings::default())
            .unwrap();
    w.set_field(Field::FullName, "Ada Lovelace").unwrap();

    let token = w
        .begin_avatar_upload(&AvatarUpload::new("image/png", 100))
        .unwrap();
    let err = w.complete_avatar_upload(token, Ok(avatar())).unwrap_err();
    assert!(matches!(err, TicketError::Render(_)));
    assert!(w.state().avatar.is_none());
    assert!(!w.plan().has_avatar_image());

    // The widget keeps painting after the failed upload.
    w.set_field(Field::GithubUsername, "ada").unwrap();
    assert_eq!(w.plan().text(TextRole::Name), Some("Ada Lovelace"));
    assert_eq!(w.plan().text(TextRole::Handle), Some("@ada"));
}

#[test]
fn oversized_avatar_is_refused_and_widget_keeps_painting() {
    let mut wide = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        70_000,
        1,
        image::Rgba([10, 20, 30, 255]),
    ))
    .write_to(&mut std::io::Cursor::new(&mut wide), image::ImageFormat::Png)
    .unwrap();
    assert!(wide.len() as u64 <= crate::assets::avatar::MAX_AVATAR_BYTES);

    let mut w = TicketWidget::from_settings(&TicketSettings::default()).unwrap();
    let err = w.load_avatar("image/png", &wide).unwrap_err();
    assert!(matches!(err, TicketError::Avatar(AvatarRejection::Decode(_))));
    assert!(w.state().avatar.is_none());

    w.set_field(Field::FullName, "Ada Lovelace").unwrap();
    assert_eq!(w.plan().text(TextRole::Name), Some("Ada Lovelace"));
    assert_eq!(w.state().full_name, "Ada Lovelace");
}
