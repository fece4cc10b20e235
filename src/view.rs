use crate::geometry::Point;
use palette::Srgba;
use std::rc::Rc;

/// Optional extras a display item may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDecor {
    /// Background tint, drawn over the slot background.
    pub rarity_tint: Option<Srgba<f64>>,
    /// Secondary text such as a stack count.
    pub right_text: Option<String>,
    durability: Option<f64>,
    pub right_align: bool,
}

impl Default for ItemDecor {
    fn default() -> Self {
        Self {
            rarity_tint: None,
            right_text: None,
            durability: None,
            right_align: true,
        }
    }
}

impl ItemDecor {
    pub fn with_tint(mut self, tint: Srgba<f64>) -> Self {
        self.rarity_tint = Some(tint);
        self
    }

    pub fn with_right_text(mut self, text: impl Into<String>) -> Self {
        self.right_text = Some(text.into()).filter(|t: &String| !t.is_empty());
        self
    }

    /// Clamped to `0..=1`; NaN hides the bar.
    pub fn with_durability(mut self, fraction: f64) -> Self {
        self.durability = (!fraction.is_nan()).then(|| fraction.clamp(0.0, 1.0));
        self
    }

    pub fn durability(&self) -> Option<f64> {
        self.durability
    }
}

/// Display-agnostic representation of one slot's contents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayItem {
    pub name: String,
    /// Opaque icon reference (asset path, atlas key, ...).
    pub icon: Option<String>,
    pub decor: Option<ItemDecor>,
}

impl DisplayItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_decor(mut self, decor: ItemDecor) -> Self {
        self.decor = Some(decor);
        self
    }
}

/// Translates business data to and from display items. The wheel only hands
/// it to views; it never drives internal logic.
pub trait ItemAdapter<T> {
    /// `None` renders the slot as empty.
    fn to_display(&self, item: &T) -> Option<DisplayItem>;

    fn from_display(&self, _item: &DisplayItem) -> Option<T> {
        None
    }
}

impl<T, F> ItemAdapter<T> for F
where
    F: Fn(&T) -> Option<DisplayItem>,
{
    fn to_display(&self, item: &T) -> Option<DisplayItem> {
        self(item)
    }
}

/// Rendering side of a wheel. All callbacks run synchronously on the
/// caller's thread, in publish order.
pub trait WheelView<T> {
    fn attach(&mut self, adapter: Rc<dyn ItemAdapter<T>>, slot_count: usize);
    fn detach(&mut self);

    fn on_wheel_shown(&mut self);
    fn on_wheel_hidden(&mut self, final_index: Option<usize>);
    fn on_slot_data_changed(&mut self, index: usize, item: Option<&T>);
    fn on_slots_swapped(&mut self, a: usize, b: usize);
    fn on_selection_changed(&mut self, index: Option<usize>);
    fn on_hover_changed(&mut self, index: Option<usize>);

    /// Wheel center in the same coordinate space as input positions.
    fn wheel_center(&self) -> Point;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durability_clamped() {
        assert_eq!(ItemDecor::default().with_durability(1.7).durability(), Some(1.0));
        assert_eq!(ItemDecor::default().with_durability(-2.0).durability(), Some(0.0));
        assert_eq!(ItemDecor::default().with_durability(0.25).durability(), Some(0.25));
        assert_eq!(ItemDecor::default().with_durability(f64::NAN).durability(), None);
    }

    #[test]
    fn test_empty_right_text_hidden() {
        assert_eq!(ItemDecor::default().with_right_text("").right_text, None);
        assert_eq!(
            ItemDecor::default().with_right_text("x12").right_text.as_deref(),
            Some("x12")
        );
    }

    #[test]
    fn test_closure_adapter() {
        let adapter: &dyn ItemAdapter<u32> =
            &|n: &u32| (*n > 0).then(|| DisplayItem::new(format!("#{n}")));
        assert_eq!(adapter.to_display(&0), None);
        assert_eq!(adapter.to_display(&7).map(|d| d.name), Some("#7".to_string()));
        assert_eq!(adapter.from_display(&DisplayItem::new("#7")), None);
    }

    #[test]
    fn test_decorated_item() {
        let tint = Srgba::new(0.8, 0.6, 0.1, 0.5);
        let item = DisplayItem::new("Bandage")
            .with_icon("items/bandage.png")
            .with_decor(ItemDecor::default().with_tint(tint).with_right_text("3"));
        let decor = item.decor.as_ref().unwrap();
        assert_eq!(decor.rarity_tint, Some(tint));
        assert!(decor.right_align);
    }
}
