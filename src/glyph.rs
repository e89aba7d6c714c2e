//! Glyph categories that drive vertical-writing placement.

/// Small kana are set at this fraction of a full glyph in vertical text.
pub const SMALL_KANA_RATIO: f64 = 0.55;

/// Placement category of a single character unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Space,
    SmallKana,
    HyphenDash,
    /// Round, square and angle brackets: drawn turned a quarter clockwise.
    ParenRotated,
    /// Opening corner brackets `「『`.
    ParenQuoteOpen,
    /// Closing corner brackets `』」`.
    ParenQuoteClose,
    CommaPeriod,
    Other,
}

/// Classification order. The first row whose set contains the character wins.
const CATEGORY_TABLE: [(Category, &str); 7] = [
    (Category::Space, " \u{3000}"),
    (
        Category::SmallKana,
        "ぁぃぅぇぉっゃゅょゎゕゖァィゥェォヵㇰヶㇱㇲッㇳㇴㇵㇶㇷㇸㇹㇺャュョㇻㇼㇽㇾㇿヮ",
    ),
    (Category::HyphenDash, "-－―ー=＝≡～"),
    (
        Category::ParenRotated,
        "(（[［〔【｛〈《≪｟⁅〖〘«»〙〗⁆｠≫》〉｝】〕］]）)",
    ),
    (Category::ParenQuoteOpen, "「『"),
    (Category::ParenQuoteClose, "』」"),
    (Category::CommaPeriod, "、。，．"),
];

impl Category {
    /// Classifies one character unit. Multi-code-point units never match a
    /// set and fall through to [`Category::Other`].
    pub fn of(unit: &str) -> Category {
        let mut chars = unit.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Category::Other;
        };

        CATEGORY_TABLE
            .iter()
            .find(|(_, set)| set.contains(c))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }

    /// Dashes and brackets are drawn rotated, so their ink box is measured
    /// with width and height exchanged.
    pub fn is_rotated(self) -> bool {
        self == Category::HyphenDash || self.is_bracket()
    }

    pub fn is_bracket(self) -> bool {
        matches!(
            self,
            Category::ParenRotated | Category::ParenQuoteOpen | Category::ParenQuoteClose
        )
    }
}
