//! deckfill-enhance - full deck with one picture per slide.

fn main() {
    deckfill_cli::main(deckfill::Variant::Enhanced);
}
