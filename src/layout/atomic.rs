//! Elements that are never split: pictures, frames and page breaks. They
//! fit, move to the next page, or (when forced onto an empty page) are
//! placed anyway and allowed to overflow.

use super::{Division, LayoutContext};
use crate::model::{Element, ElementKind};

pub(crate) fn divide(element: Element, ctx: &LayoutContext<'_>, height: f64) -> Division {
    let res = ctx.resolution;
    match &element.kind {
        ElementKind::PageBreak => Division::page_break(),
        ElementKind::Picture { height: h, .. } => {
            let picture_height = res.cm_to_y(*h);
            if picture_height <= height || ctx.force {
                Division::whole(element, picture_height)
            } else {
                log::debug!("moving picture of height {picture_height:.1} to the next page");
                Division::defer(element)
            }
        }
        ElementKind::Frame { style } => {
            let frame_height = res.cm_to_y(style.height);
            let top = res.cm_to_y(style.spacing.top);
            let bottom = res.cm_to_y(style.spacing.bottom);

            if frame_height + top + bottom <= height {
                Division::whole(element, frame_height + top + bottom)
            } else if frame_height + top <= height {
                // The bottom spacing runs off the page
                Division::whole(element, height)
            } else if ctx.force {
                Division::whole(element, frame_height + top + bottom)
            } else {
                log::debug!("moving frame of height {frame_height:.1} to the next page");
                Division::defer(element)
            }
        }
        _ => Division::whole(element, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::error::Result;
    use crate::model::Resolution;
    use crate::style::{FrameStyle, HorizontalAlign, Spacing};
    use crate::text::{MeasureRequest, TextMeasurer, TextMetrics};

    struct Unused;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    impl TextMeasurer for Unused {
        fn measure(&self, _: &MeasureRequest<'_>) -> Result<TextMetrics> {
            panic!("atomic elements are not measured")
        }
    }

    fn frame() -> Element {
        Element::frame(FrameStyle {
            spacing: Spacing {
                top: 2.0,
                bottom: 3.0,
                ..Spacing::default()
            },
            ..FrameStyle::new(10.0, 20.0)
        })
    }

    #[test]
    fn pictures_fit_move_or_overflow_when_forced() {
        let cfg = LayoutConfig::default();
        let ctx = LayoutContext::new(&Unused, Resolution::uniform(2.54), &cfg);
        let picture = Element::picture("a.png", 5.0, 30.0, HorizontalAlign::Left);

        let fits = divide(picture.clone(), &ctx, 30.5);
        assert!(close(fits.height, 30.0));
        assert!(fits.tail.is_none());

        let moved = divide(picture.clone(), &ctx, 29.0);
        assert!(moved.head.is_none());
        assert_eq!(moved.tail, Some(picture.clone()));

        let forced = divide(picture, &ctx.with_force(true), 29.0);
        assert!(close(forced.height, 30.0));
        assert!(forced.head.is_some());
    }

    #[test]
    fn frames_may_lose_their_bottom_spacing() {
        let cfg = LayoutConfig::default();
        let ctx = LayoutContext::new(&Unused, Resolution::uniform(2.54), &cfg);

        assert!(close(divide(frame(), &ctx, 30.0).height, 25.0));
        let tight = divide(frame(), &ctx, 23.0);
        assert!(close(tight.height, 23.0));
        assert!(tight.head.is_some());
        assert!(divide(frame(), &ctx, 21.0).head.is_none());
        assert!(close(divide(frame(), &ctx.with_force(true), 21.0).height, 25.0));
    }

    #[test]
    fn page_breaks_and_markers() {
        let cfg = LayoutConfig::default();
        let ctx = LayoutContext::new(&Unused, Resolution::uniform(2.54), &cfg);

        assert_eq!(divide(Element::page_break(), &ctx, 100.0), Division::page_break());
        let toc = divide(Element::table_of_contents(), &ctx, 0.0);
        assert_eq!(toc.height, 0.0);
        assert!(toc.head.is_some());
    }
}
