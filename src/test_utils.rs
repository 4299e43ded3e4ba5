//! Shared fixtures for unit and integration tests.

/// Build a minimal, valid PDF with `pages` blank US-Letter pages
/// (612 x 792 points).
///
/// Object layout: 1 catalog, 2 page tree, 3.. one object per page. The
/// cross-reference table is computed from the actual byte offsets, so the
/// output parses without repair.
#[must_use]
pub fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::with_capacity(pages + 2);
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_owned());

    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", i + 3)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages
    ));

    for _ in 0..pages {
        objects.push("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>".to_owned());
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );

    out
}
