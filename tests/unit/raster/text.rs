use super::*;
use crate::foundation::core::narrow_u16;
use crate::raster::fonts::{empty_fontdb, system_fontdb};

#[test]
fn document_escapes_markup() {
    let r = SvgTextRenderer::new(empty_fontdb());
    let doc = r.document("<b>&\"Tom's\"", 10, Rgba8::rgba(0x12, 0x34, 0x56, 255));
    assert!(doc.contains("&lt;b&gt;&amp;&quot;Tom&apos;s&quot;"));
    assert!(doc.contains(r##"fill="#123456""##));
    assert!(doc.contains(r#"font-size="10""#));
    assert!(!doc.contains("<b>"));
}

#[test]
fn font_family_is_configurable() {
    let r = SvgTextRenderer::new(empty_fontdb());
    assert!(r.document("x", 10, Rgba8::WHITE).contains(r#"font-family="sans-serif""#));

    let r = r.with_font_family("\"DejaVu Sans\", serif");
    let doc = r.document("x", 10, Rgba8::WHITE);
    assert!(doc.contains(r#"font-family="&quot;DejaVu Sans&quot;, serif""#), "{doc}");
}

#[test]
fn rejects_empty_text_and_zero_size() {
    let r = SvgTextRenderer::new(empty_fontdb());
    assert!(matches!(
        r.render_text("   ", 12, Rgba8::WHITE),
        Err(WatermarkError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        r.render_text("hello", 0, Rgba8::WHITE),
        Err(WatermarkError::InvalidConfiguration(_))
    ));
}

#[test]
fn without_fonts_nothing_is_drawable() {
    let r = SvgTextRenderer::new(empty_fontdb());
    assert!(matches!(
        r.render_text("hello", 12, Rgba8::WHITE),
        Err(WatermarkError::TextRender(_))
    ));
}

#[test]
fn renders_tight_colored_glyphs_when_fonts_exist() {
    let db = system_fontdb::<&str>(&[]);
    if db.is_empty() {
        eprintln!("no system fonts installed; skipping");
        return;
    }

    let r = SvgTextRenderer::new(db);
    let buf = match r.render_text("Hi", 32, Rgba8::rgba(255, 0, 0, 255)) {
        Ok(buf) => buf,
        Err(WatermarkError::TextRender(e)) => {
            eprintln!("no font matches sans-serif ({e}); skipping");
            return;
        }
        Err(e) => panic!("unexpected error: {e}"),
    };
    let (w, h) = buf.dimensions();
    assert!(w > 0 && w < 32 * 4, "width {w}");
    assert!(h > 0 && h <= 32 * 2, "height {h}");

    let mut inked = 0usize;
    for px in buf.as_raw().chunks_exact(4) {
        if px[3] == 0 {
            continue;
        }
        inked += 1;
        assert_eq!(narrow_u16(px[0]), 255);
        assert_eq!(px[1], 0);
    }
    assert!(inked > 0);
}
