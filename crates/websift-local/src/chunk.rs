//! Paragraph-preferring text chunker.
//!
//! Pure function of (text, budget): greedy accumulation of blank-line
//! paragraphs, with a fixed-slice fallback for a single paragraph that is
//! itself over budget. Counting is in characters, not bytes.

const SEPARATOR: &str = "\n\n";

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// Fixed slices of exactly `max_chars` characters; the tail may be shorter.
// No sentence-boundary heuristics here: an over-budget paragraph is already
// degenerate input.
fn hard_split(paragraph: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut buf = String::new();
    let mut n = 0usize;
    for ch in paragraph.chars() {
        buf.push(ch);
        n += 1;
        if n == max_chars {
            out.push(std::mem::take(&mut buf));
            n = 0;
        }
    }
    if !buf.is_empty() {
        out.push(buf);
    }
}

/// Split `text` into ordered chunks no longer than `max_chars` characters,
/// preferring paragraph boundaries. Text that already fits comes back as a
/// single identical chunk.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut cur_chars = 0usize;

    for paragraph in text.split(SEPARATOR) {
        let p_chars = char_len(paragraph);
        if cur_chars + p_chars + SEPARATOR.len() <= max_chars {
            if !cur.is_empty() {
                cur.push_str(SEPARATOR);
                cur_chars += SEPARATOR.len();
            }
            cur.push_str(paragraph);
            cur_chars += p_chars;
        } else {
            if !cur.is_empty() {
                chunks.push(std::mem::take(&mut cur));
                cur_chars = 0;
            }
            if p_chars > max_chars {
                hard_split(paragraph, max_chars, &mut chunks);
            } else {
                cur = paragraph.to_string();
                cur_chars = p_chars;
            }
        }
    }
    if !cur.is_empty() {
        chunks.push(cur);
    }
    chunks
}
