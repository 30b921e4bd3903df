//! deckfill-trim - short preview deck without pictures.

fn main() {
    deckfill_cli::main(deckfill::Variant::Trimmed);
}
