//! Embedded fonts used by the compositor.

use std::sync::LazyLock;

use ab_glyph::FontRef;

static SANS_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static SANS_BOLD_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

pub(crate) static SANS: LazyLock<FontRef<'static>> =
    LazyLock::new(|| FontRef::try_from_slice(SANS_BYTES).expect("embedded DejaVuSans parses"));

pub(crate) static SANS_BOLD: LazyLock<FontRef<'static>> =
    LazyLock::new(|| FontRef::try_from_slice(SANS_BOLD_BYTES).expect("embedded DejaVuSans-Bold parses"));
