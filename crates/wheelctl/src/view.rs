use palette::Srgba;
use quickwheel::{Compass, DisplayItem, ItemAdapter, ItemDecor, Point, WheelView};
use std::rc::Rc;

/// `name[:count]` becomes a display item with the count as right text.
pub fn item_adapter(item: &String) -> Option<DisplayItem> {
    let (name, count) = match item.split_once(':') {
        Some((name, count)) => (name, Some(count)),
        None => (item.as_str(), None),
    };
    if name.is_empty() {
        return None;
    }
    let mut display = DisplayItem::new(name);
    if let Some(count) = count {
        let mut decor = ItemDecor::default().with_right_text(count);
        if count.parse::<u32>().is_ok_and(|n| n == 0) {
            decor = decor.with_tint(Srgba::new(0.5, 0.5, 0.5, 0.6));
        }
        display = display.with_decor(decor);
    }
    Some(display)
}

/// Prints every callback on stdout.
pub struct ConsoleView {
    adapter: Option<Rc<dyn ItemAdapter<String>>>,
    center: Point,
}

impl ConsoleView {
    pub fn new(center: Point) -> Self {
        Self {
            adapter: None,
            center,
        }
    }

    fn describe(&self, item: Option<&String>) -> String {
        let display = item.and_then(|i| self.adapter.as_ref()?.to_display(i));
        match display {
            Some(DisplayItem {
                name,
                decor: Some(decor),
                ..
            }) => match decor.right_text {
                Some(text) => format!("{name} x{text}"),
                None => name,
            },
            Some(display) => display.name,
            None => "(empty)".to_string(),
        }
    }
}

fn slot_label(index: usize) -> String {
    match Compass::from_slot(index) {
        Some(direction) => format!("{index} ({direction})"),
        None => index.to_string(),
    }
}

fn index_label(index: Option<usize>) -> String {
    index.map_or_else(|| "none".to_string(), slot_label)
}

impl WheelView<String> for ConsoleView {
    fn attach(&mut self, adapter: Rc<dyn ItemAdapter<String>>, slot_count: usize) {
        self.adapter = Some(adapter);
        println!("view attached, {slot_count} slots");
    }

    fn detach(&mut self) {
        self.adapter = None;
        println!("view detached");
    }

    fn on_wheel_shown(&mut self) {
        println!("wheel shown");
    }

    fn on_wheel_hidden(&mut self, final_index: Option<usize>) {
        println!("wheel hidden, final slot {}", index_label(final_index));
    }

    fn on_slot_data_changed(&mut self, index: usize, item: Option<&String>) {
        println!("slot {}: {}", slot_label(index), self.describe(item));
    }

    fn on_slots_swapped(&mut self, a: usize, b: usize) {
        println!("swapped {} <-> {}", slot_label(a), slot_label(b));
    }

    fn on_selection_changed(&mut self, index: Option<usize>) {
        println!("selected {}", index_label(index));
    }

    fn on_hover_changed(&mut self, index: Option<usize>) {
        println!("hover {}", index_label(index));
    }

    fn wheel_center(&self) -> Point {
        self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_adapter() {
        let plain = item_adapter(&"rope".to_string()).unwrap();
        assert_eq!(plain.name, "rope");
        assert!(plain.decor.is_none());

        let stacked = item_adapter(&"ammo:30".to_string()).unwrap();
        let decor = stacked.decor.unwrap();
        assert_eq!(decor.right_text.as_deref(), Some("30"));
        assert!(decor.rarity_tint.is_none());

        let spent = item_adapter(&"ammo:0".to_string()).unwrap();
        assert!(spent.decor.unwrap().rarity_tint.is_some());

        assert_eq!(item_adapter(&":4".to_string()), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(slot_label(1), "1 (East)");
        assert_eq!(slot_label(8), "8");
        assert_eq!(index_label(None), "none");
    }
}
