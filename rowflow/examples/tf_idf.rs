//! TF-IDF over a small document set: the three strongest documents for
//! every word.  Exercises node sharing: the split-words plan feeds both
//! the IDF and the TF branch, and the raw source feeds the document
//! counter as well.

use anyhow::Result;
use rowflow::*;

fn tf_idf_graph() -> Graph {
    let split_words = Graph::from_iter("texts")
        .map(FilterPunctuation::new("text"))
        .map(LowerCase::new("text"))
        .map(Split::new("text"));

    let doc_count = Graph::from_iter("texts").reduce(Count::new("docs"), &[]);

    let idf = split_words
        .sort(&["doc_id", "text"])
        .reduce(First, &["doc_id", "text"])
        .sort(&["text"])
        .reduce(Count::new("docs_with_word"), &["text"])
        .join(InnerJoiner::new(), &doc_count, &[])
        .map(Arithmetic::new(
            |args| {
                let docs = args[0].as_f64().unwrap();
                let docs_with_word = args[1].as_f64().unwrap();
                Ok(Value::Float((docs / docs_with_word).ln()))
            },
            &["docs", "docs_with_word"],
            "idf",
        ));

    let tf = split_words
        .sort(&["doc_id"])
        .reduce(TermFrequency::new("text"), &["doc_id"]);

    tf.sort(&["text"])
        .join(InnerJoiner::new(), &idf, &["text"])
        .map(Product::new(&["tf", "idf"], "tf_idf"))
        .map(Project::new(&["doc_id", "text", "tf_idf"]))
        .sort(&["text"])
        .reduce(TopN::new("tf_idf", 3), &["text"])
}

fn main() -> Result<()> {
    env_logger::init();
    let inputs = Inputs::new().rows(
        "texts",
        vec![
            row! { "doc_id": 1, "text": "hello, little world" },
            row! { "doc_id": 2, "text": "little" },
            row! { "doc_id": 3, "text": "little little little" },
            row! { "doc_id": 4, "text": "little? hello little world" },
            row! { "doc_id": 5, "text": "HELLO HELLO! WORLD..." },
            row! { "doc_id": 6, "text": "world? world... world!" },
        ],
    );
    for row in tf_idf_graph().run(&inputs)? {
        println!("{}", row?);
    }
    Ok(())
}
