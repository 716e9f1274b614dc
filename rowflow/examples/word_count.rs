//! Counts words across a handful of documents, least frequent first.

use anyhow::Result;
use rowflow::*;

fn main() -> Result<()> {
    env_logger::init();
    let word_count = Graph::from_iter("texts")
        .map(FilterPunctuation::new("text"))
        .map(LowerCase::new("text"))
        .map(Split::new("text"))
        .sort(&["text"])
        .reduce(Count::new("count"), &["text"])
        .sort(&["count", "text"]);

    let inputs = Inputs::new().rows(
        "texts",
        vec![
            row! { "text": "When shall we three meet again?" },
            row! { "text": "In thunder, lightning, or in rain?" },
            row! { "text": "When the hurlyburly's done, when the battle's lost and won." },
        ],
    );
    for row in word_count.run(&inputs)? {
        println!("{}", row?);
    }
    Ok(())
}
