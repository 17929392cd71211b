/// Divisor turning horizontal offset into card tilt, in degrees.
pub const CARD_INCLINATION: f32 = 10.0;

/// Releasing the card at or beyond this offset asks to skip the question.
pub const CARD_SKIP_AREA: f32 = -200.0;

/// Left-only drag of the question card.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CardDrag {
    position: f32,
}

impl CardDrag {
    pub fn update(&mut self, translation_x: f32) {
        if translation_x < 0.0 {
            self.position = translation_x;
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn tilt(&self) -> f32 {
        self.position / CARD_INCLINATION
    }

    /// Springs the card back and reports whether a skip should be offered.
    pub fn release(&mut self, translation_x: f32) -> bool {
        self.position = 0.0;
        translation_x <= CARD_SKIP_AREA
    }
}
