// Filename size directive resolution

use responsive_image::image_optimizer::TargetSize;
use responsive_image::sizing::{resolve, NamedSizeTable, RequestedSize};

#[test]
fn test_every_named_key_resolves_to_its_entry() {
    let specs = [("-s", "100"), ("-m", "320x240"), ("-l", "800x600"), ("-thumb", "64x64")];
    let table = NamedSizeTable::from_specs(specs).unwrap();

    for key in table.keys() {
        let expected = table.get(key).unwrap();
        assert_eq!(
            resolve(&format!("img{}", key), &table),
            RequestedSize::Target(expected),
            "key {}",
            key
        );
    }
}

#[test]
fn test_numeric_grammars() {
    let table = NamedSizeTable::new();
    for (w, h) in [(1, 1), (200, 400), (1920, 1080), (4_000_000, 3)] {
        assert_eq!(
            resolve(&format!("img-{}x{}", w, h), &table),
            RequestedSize::Target(TargetSize::new(w, h))
        );
        assert_eq!(
            resolve(&format!("img-{}", w), &table),
            RequestedSize::Target(TargetSize::width_only(w))
        );
    }
}

#[test]
fn test_named_entry_shadows_numeric_grammar() {
    let table = NamedSizeTable::from_specs([("-100", "50x50")]).unwrap();
    assert_eq!(
        resolve("img-100", &table),
        RequestedSize::Target(TargetSize::new(50, 50))
    );
}

#[test]
fn test_unresolved_names() {
    let table = NamedSizeTable::from_specs([("-s", "100")]).unwrap();
    for name in ["img", "img-", "img-big", "img-200x", "img-x200", "img-200x400x2", "img-99999999999"] {
        assert_eq!(resolve(name, &table), RequestedSize::Unresolved, "name {}", name);
        assert_eq!(resolve(name, &table).target(), None);
    }
}

#[test]
fn test_zero_dimensions_are_syntactically_accepted() {
    let table = NamedSizeTable::new();
    assert_eq!(
        resolve("img-0x10", &table),
        RequestedSize::Target(TargetSize::new(0, 10))
    );
    assert_eq!(
        resolve("img-0", &table).target(),
        Some(TargetSize::width_only(0))
    );
}
