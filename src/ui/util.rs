use rust_decimal::Decimal;

/// Format an amount with the currency prefix, thousand separators and two
/// decimal places, e.g. `Rs1,234.50`.
pub(crate) fn format_amount(val: Decimal, currency: &str) -> String {
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-{currency}{with_commas}.{dec_part}")
    } else {
        format!("{currency}{with_commas}.{dec_part}")
    }
}

/// `1 item`, `3 items`.
pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Cut `s` down to `max` characters, the last one being "…" when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_none() {
        return head;
    }
    let mut head: String = head.chars().take(max.saturating_sub(1)).collect();
    if max > 0 {
        head.push('…');
    }
    head
}

/// Selected row plus the first visible row of a scrolling list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub(crate) index: usize,
    pub(crate) scroll: usize,
}

impl ListCursor {
    pub(crate) fn down(&mut self, len: usize, page: usize) {
        if self.index + 1 < len {
            self.index += 1;
            self.follow(page);
        }
    }

    pub(crate) fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
        self.scroll = self.scroll.min(self.index);
    }

    pub(crate) fn top(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn bottom(&mut self, len: usize, page: usize) {
        if len > 0 {
            self.index = len - 1;
            self.follow(page);
        }
    }

    /// Point at `index` without scrolling past it.
    pub(crate) fn jump(&mut self, index: usize) {
        self.index = index;
        self.scroll = self.scroll.min(index);
    }

    /// Keep the cursor inside a list that may have shrunk.
    pub(crate) fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
        self.scroll = self.scroll.min(self.index);
    }

    fn follow(&mut self, page: usize) {
        let page = page.max(1);
        if self.index >= self.scroll + page {
            self.scroll = self.index + 1 - page;
        }
    }
}

/// Split `"<label> <amount>"` on the last space.
pub(crate) fn split_trailing_amount(args: &str) -> Option<(&str, &str)> {
    let (label, amount) = args.trim().rsplit_once(' ')?;
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some((label, amount))
}

/// Split `"<name> | <description>"`. The description part is optional.
pub(crate) fn split_description(args: &str) -> (&str, Option<&str>) {
    match args.split_once('|') {
        Some((name, desc)) => (name.trim(), Some(desc.trim())),
        None => (args.trim(), None),
    }
}
