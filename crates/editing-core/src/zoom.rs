//! Zoom interpolation and live zoom editing.
//!
//! A zoom span interpolates linearly from its start state to its end state
//! over `[start_time, end_time]` (clip-relative). While the selected zoom
//! span is under the playhead, wheel and drag input edit its end state and
//! write it back to the store immediately, so the preview and the stored
//! value never diverge.

use montage_common::EditingConfig;
use montage_project_model::{Animation, AnimationId, AnimationProps, Clip, ZoomProps, ZoomState};
use montage_timeline_store::{TimelineState, TimelineStore};

/// Linear blend from `a` to `b` at `t ∈ [0, 1]`.
pub fn lerp_state(a: &ZoomState, b: &ZoomState, t: f64) -> ZoomState {
    let t = t.clamp(0.0, 1.0);
    ZoomState {
        level: a.level + (b.level - a.level) * t,
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    }
}

/// Progress through a span at a clip-relative time, clamped to `[0, 1]`.
///
/// A zero-length span jumps straight to its end state once reached.
pub fn span_progress(animation: &Animation, clip_time: f64) -> f64 {
    let length = animation.end_time - animation.start_time;
    if length <= 0.0 {
        return if clip_time >= animation.start_time { 1.0 } else { 0.0 };
    }
    ((clip_time - animation.start_time) / length).clamp(0.0, 1.0)
}

/// Interpolated zoom state of `props` at `progress`.
pub fn interpolate(props: &ZoomProps, progress: f64) -> ZoomState {
    lerp_state(&props.start, &props.end, progress)
}

/// Zoom state of a zoom animation at a clip-relative time.
///
/// Returns `None` for non-zoom animations. Times outside the span clamp to
/// the nearest end state.
pub fn zoom_at(animation: &Animation, clip_time: f64) -> Option<ZoomState> {
    let props = animation.zoom()?;
    Some(interpolate(props, span_progress(animation, clip_time)))
}

/// The first zoom span on `clip` active at `clip_time`, with its state.
pub fn active_zoom(clip: &Clip, clip_time: f64) -> Option<(&Animation, ZoomState)> {
    clip.animations
        .iter()
        .filter(|a| a.is_active_at(clip_time))
        .find_map(|a| zoom_at(a, clip_time).map(|state| (a, state)))
}

/// Native video size against the size it is drawn at in the preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewGeometry {
    pub native_width: f64,
    pub native_height: f64,
    pub rendered_width: f64,
    pub rendered_height: f64,
}

impl PreviewGeometry {
    pub fn new(native: (f64, f64), rendered: (f64, f64)) -> Self {
        Self {
            native_width: native.0,
            native_height: native.1,
            rendered_width: rendered.0,
            rendered_height: rendered.1,
        }
    }

    /// Source pixels per preview pixel on each axis. 1.0 on a degenerate axis.
    pub fn scale(&self) -> (f64, f64) {
        let ratio = |native: f64, rendered: f64| {
            if rendered > 0.0 && native > 0.0 {
                native / rendered
            } else {
                1.0
            }
        };
        (
            ratio(self.native_width, self.rendered_width),
            ratio(self.native_height, self.rendered_height),
        )
    }
}

/// What the preview should draw for the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPreview {
    pub state: ZoomState,
    /// True when the shown span is the selected one and accepts live edits.
    pub interactive: bool,
}

impl ZoomPreview {
    /// Zoom transform for the active clip at the playhead.
    ///
    /// The selected span wins while it is interactive; otherwise the first
    /// active zoom span is rendered from stored values. `None` means no zoom.
    pub fn for_state(state: &TimelineState) -> Option<Self> {
        let clip = state.active_clip()?;
        let clip_time = state.current_clip_time();

        if let Some(selected) = interactive_selection(state) {
            return zoom_at(selected, clip_time).map(|zoom| Self {
                state: zoom,
                interactive: true,
            });
        }

        active_zoom(clip, clip_time).map(|(_, zoom)| Self {
            state: zoom,
            interactive: false,
        })
    }
}

/// The selected animation when it is a zoom span on the active clip and the
/// playhead lies inside it.
pub fn interactive_selection(state: &TimelineState) -> Option<&Animation> {
    let selected = state.selected_animation.as_ref()?;
    let clip = state.active_clip()?;
    if clip.id != selected.clip_id {
        return None;
    }
    let animation = clip.animation(&selected.animation.id)?;
    animation.zoom()?;
    animation
        .is_active_at(state.current_clip_time())
        .then_some(animation)
}

#[derive(Debug, Clone, Copy)]
struct PanAnchor {
    pointer: (f64, f64),
    end: ZoomState,
}

/// Live editor for the selected zoom span's end state.
#[derive(Debug)]
pub struct ZoomEditor {
    step: f64,
    min_level: f64,
    max_level: f64,
    pan: Option<(AnimationId, PanAnchor)>,
}

impl ZoomEditor {
    pub fn new(config: &EditingConfig) -> Self {
        Self {
            step: config.zoom_step,
            min_level: config.zoom_min,
            max_level: config.zoom_max,
            pan: None,
        }
    }

    /// Whether the store's current snapshot accepts live zoom edits.
    pub fn is_interactive(store: &TimelineStore) -> bool {
        interactive_selection(store.state()).is_some()
    }

    /// Apply wheel input. Positive `notches` zoom in.
    ///
    /// Returns the new end state, or `None` when no zoom span is interactive.
    pub fn wheel(&mut self, store: &mut TimelineStore, notches: f64) -> Option<ZoomState> {
        let (id, mut props) = selected_props(store)?;
        props.end.level =
            (props.end.level + notches * self.step).clamp(self.min_level, self.max_level);
        let end = props.end;
        write_props(store, &id, props);
        tracing::trace!(animation_id = %id, level = end.level, "Zoom level edited");
        Some(end)
    }

    /// Begin a pan drag on the preview.
    pub fn begin_pan(&mut self, store: &TimelineStore, pointer: (f64, f64)) -> bool {
        let Some((id, props)) = selected_props(store) else {
            return false;
        };
        self.pan = Some((
            id,
            PanAnchor {
                pointer,
                end: props.end,
            },
        ));
        true
    }

    /// Continue a pan drag. The offset is computed from the anchor captured
    /// at [`ZoomEditor::begin_pan`], scaled from preview to source pixels.
    ///
    /// The drag is dropped if the selection moved to another span.
    pub fn pan_to(
        &mut self,
        store: &mut TimelineStore,
        pointer: (f64, f64),
        geometry: &PreviewGeometry,
    ) -> Option<ZoomState> {
        let (anchor_id, anchor) = self.pan.clone()?;
        let Some((id, mut props)) = selected_props(store) else {
            self.pan = None;
            return None;
        };
        if id != anchor_id {
            self.pan = None;
            return None;
        }

        let (sx, sy) = geometry.scale();
        props.end.x = anchor.end.x + (pointer.0 - anchor.pointer.0) * sx;
        props.end.y = anchor.end.y + (pointer.1 - anchor.pointer.1) * sy;
        let end = props.end;
        write_props(store, &id, props);
        Some(end)
    }

    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }
}

fn selected_props(store: &TimelineStore) -> Option<(AnimationId, ZoomProps)> {
    let animation = interactive_selection(store.state())?;
    Some((animation.id.clone(), *animation.zoom()?))
}

fn write_props(store: &mut TimelineStore, id: &AnimationId, props: ZoomProps) {
    store.update_animation(
        id,
        montage_project_model::AnimationUpdate::properties(AnimationProps::Zoom(props)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_project_model::{AnimationDraft, ClipDraft, MediaSource};
    use montage_timeline_store::TimeSource;

    fn zoom_props() -> ZoomProps {
        ZoomProps {
            start: ZoomState::IDENTITY,
            end: ZoomState::new(2.0, 100.0, 50.0),
        }
    }

    fn zoom_animation(start: f64, end: f64) -> Animation {
        Animation::new(
            AnimationId::from("z"),
            start,
            end,
            AnimationProps::Zoom(zoom_props()),
        )
    }

    fn store_with_zoom() -> (TimelineStore, AnimationId) {
        let mut store = TimelineStore::empty("zoom");
        store.add_clip(
            ClipDraft::new(
                "a",
                MediaSource::Url {
                    url: "https://cdn.example/a.mp4".to_string(),
                },
                10.0,
            )
            .with_video_size(1920, 1080),
        );
        let id = store
            .add_animation(AnimationDraft::new(
                2.0,
                4.0,
                AnimationProps::Zoom(zoom_props()),
            ))
            .unwrap();
        (store, id)
    }

    fn approx(a: ZoomState, b: ZoomState) {
        assert!((a.level - b.level).abs() < 1e-9, "{a:?} vs {b:?}");
        assert!((a.x - b.x).abs() < 1e-9, "{a:?} vs {b:?}");
        assert!((a.y - b.y).abs() < 1e-9, "{a:?} vs {b:?}");
    }

    #[test]
    fn test_zoom_endpoints_and_midpoint() {
        let anim = zoom_animation(2.0, 4.0);
        approx(zoom_at(&anim, 2.0).unwrap(), ZoomState::IDENTITY);
        approx(zoom_at(&anim, 4.0).unwrap(), ZoomState::new(2.0, 100.0, 50.0));
        approx(zoom_at(&anim, 3.0).unwrap(), ZoomState::new(1.5, 50.0, 25.0));
    }

    #[test]
    fn test_zoom_clamps_outside_span() {
        let anim = zoom_animation(2.0, 4.0);
        approx(zoom_at(&anim, 0.0).unwrap(), ZoomState::IDENTITY);
        approx(zoom_at(&anim, 9.0).unwrap(), ZoomState::new(2.0, 100.0, 50.0));
    }

    #[test]
    fn test_zero_length_span() {
        let anim = zoom_animation(3.0, 3.0);
        approx(zoom_at(&anim, 2.9).unwrap(), ZoomState::IDENTITY);
        approx(zoom_at(&anim, 3.0).unwrap(), ZoomState::new(2.0, 100.0, 50.0));
    }

    #[test]
    fn test_non_zoom_animation_has_no_zoom() {
        let anim = Animation::new(
            AnimationId::from("t"),
            0.0,
            1.0,
            AnimationProps::Text(Default::default()),
        );
        assert!(zoom_at(&anim, 0.5).is_none());
    }

    #[test]
    fn test_selected_span_is_interactive_only_under_playhead() {
        let (mut store, id) = store_with_zoom();
        store.select_animation(&id);
        assert!(!ZoomEditor::is_interactive(&store));

        store.set_current_time(3.0, TimeSource::Scrub);
        assert!(ZoomEditor::is_interactive(&store));

        store.set_current_time(5.0, TimeSource::Scrub);
        assert!(!ZoomEditor::is_interactive(&store));
    }

    #[test]
    fn test_wheel_writes_back_and_clamps() {
        let (mut store, id) = store_with_zoom();
        store.select_animation(&id);
        store.set_current_time(4.0, TimeSource::Scrub);

        let mut editor = ZoomEditor::new(&EditingConfig::default());
        let end = editor.wheel(&mut store, 3.0).unwrap();
        assert!((end.level - 2.3).abs() < 1e-9);

        let stored = store.active_clip().unwrap().animation(&id).unwrap();
        assert!((stored.zoom().unwrap().end.level - 2.3).abs() < 1e-9);
        let selected = store.selected_animation().unwrap();
        assert_eq!(selected.animation, *stored);

        let end = editor.wheel(&mut store, 500.0).unwrap();
        assert!((end.level - 10.0).abs() < 1e-9);
        let end = editor.wheel(&mut store, -500.0).unwrap();
        assert!((end.level - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_is_ignored_without_interactive_span() {
        let (mut store, id) = store_with_zoom();
        let mut editor = ZoomEditor::new(&EditingConfig::default());
        assert!(editor.wheel(&mut store, 1.0).is_none());
        let stored = store.active_clip().unwrap().animation(&id).unwrap();
        assert!((stored.zoom().unwrap().end.level - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pan_scales_pointer_to_source_pixels() {
        let (mut store, id) = store_with_zoom();
        store.select_animation(&id);
        store.set_current_time(3.0, TimeSource::Scrub);

        let geometry = PreviewGeometry::new((1920.0, 1080.0), (960.0, 540.0));
        let mut editor = ZoomEditor::new(&EditingConfig::default());
        assert!(editor.begin_pan(&store, (100.0, 100.0)));

        editor.pan_to(&mut store, (110.0, 105.0), &geometry).unwrap();
        let end = editor.pan_to(&mut store, (120.0, 110.0), &geometry).unwrap();
        // Offsets are measured from the anchor, not accumulated per move.
        assert!((end.x - 140.0).abs() < 1e-9);
        assert!((end.y - 70.0).abs() < 1e-9);

        editor.end_pan();
        assert!(editor.pan_to(&mut store, (0.0, 0.0), &geometry).is_none());
    }

    #[test]
    fn test_preview_falls_back_to_stored_values() {
        let (mut store, _id) = store_with_zoom();
        store.set_current_time(3.0, TimeSource::Scrub);
        let preview = ZoomPreview::for_state(store.state()).unwrap();
        assert!(!preview.interactive);
        assert!((preview.state.level - 1.5).abs() < 1e-9);

        store.set_current_time(6.0, TimeSource::Scrub);
        assert!(ZoomPreview::for_state(store.state()).is_none());
    }

    #[test]
    fn test_editing_one_span_leaves_others_untouched() {
        let (mut store, first) = store_with_zoom();
        let second = store
            .add_animation(AnimationDraft::new(
                6.0,
                8.0,
                AnimationProps::Zoom(zoom_props()),
            ))
            .unwrap();
        store.select_animation(&first);
        store.set_current_time(3.0, TimeSource::Scrub);

        let mut editor = ZoomEditor::new(&EditingConfig::default());
        editor.wheel(&mut store, 5.0).unwrap();

        let clip = store.active_clip().unwrap();
        assert!((clip.animation(&second).unwrap().zoom().unwrap().end.level - 2.0).abs() < 1e-9);
    }
}
