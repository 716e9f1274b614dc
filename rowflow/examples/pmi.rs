//! Pointwise mutual information: for every document, the ten words most
//! characteristic of it relative to the whole corpus.  Only words of
//! more than four letters appearing at least twice in a document count.

use anyhow::Result;
use rowflow::*;

fn pmi_graph() -> Graph {
    // occurrences of each (word, document) pair that pass the filter
    let pair_counts = Graph::from_iter("texts")
        .map(FilterPunctuation::new("text"))
        .map(LowerCase::new("text"))
        .map(Split::new("text"))
        .sort(&["text"])
        .reduce(Count::new("pair_count"), &["text", "doc_id"])
        .map(Filter::new(|row| {
            let count = row.get("pair_count").ok().and_then(|v| v.as_int());
            let word = row.get("text").ok().and_then(|v| v.as_str().map(str::len));
            count.is_some_and(|n| n >= 2) && word.is_some_and(|len| len > 4)
        }))
        .sort(&["doc_id"]);

    let words_per_doc = pair_counts
        .sort(&["doc_id"])
        .reduce(Sum::new("pair_count"), &["doc_id"])
        .map(RenameColumn::new("pair_count", "doc_words"));

    let ratio = |args: &[Value]| -> rowflow::Result<Value> {
        Ok(Value::Float(
            args[0].as_f64().unwrap() / args[1].as_f64().unwrap(),
        ))
    };

    // frequency of the word within its document
    let freq_in_doc = pair_counts
        .join(InnerJoiner::new(), &words_per_doc, &["doc_id"])
        .map(Arithmetic::new(
            ratio,
            &["pair_count", "doc_words"],
            "freq_in_doc",
        ))
        .map(Project::new(&["text", "doc_id", "freq_in_doc"]))
        .sort(&["text"]);

    let total_words = pair_counts
        .reduce(Sum::new("pair_count"), &[])
        .map(RenameColumn::new("pair_count", "total_words"));

    // frequency of the word across the whole corpus
    let freq_overall = pair_counts
        .sort(&["text"])
        .reduce(Sum::new("pair_count"), &["text"])
        .map(RenameColumn::new("pair_count", "word_total"))
        .join(InnerJoiner::new(), &total_words, &[])
        .map(Arithmetic::new(
            ratio,
            &["word_total", "total_words"],
            "freq_overall",
        ))
        .map(Project::new(&["text", "freq_overall"]))
        .sort(&["text"]);

    freq_in_doc
        .join(InnerJoiner::new(), &freq_overall, &["text"])
        .map(Arithmetic::new(
            |args| {
                let in_doc = args[0].as_f64().unwrap();
                let overall = args[1].as_f64().unwrap();
                Ok(Value::Float((in_doc / overall).ln()))
            },
            &["freq_in_doc", "freq_overall"],
            "pmi",
        ))
        .sort(&["doc_id"])
        .reduce(TopN::new("pmi", 10), &["doc_id"])
        .map(Project::new(&["doc_id", "text", "pmi"]))
        .sort(&["doc_id"])
}

fn main() -> Result<()> {
    env_logger::init();
    let inputs = Inputs::new().rows(
        "texts",
        vec![
            row! { "doc_id": 1, "text": "hello, hello little world little world" },
            row! { "doc_id": 2, "text": "little little little" },
            row! { "doc_id": 3, "text": "a little brown fox, a wonderful fox of wonders" },
            row! { "doc_id": 4, "text": "fox fox fox jumped over the fence fence fence" },
        ],
    );
    for row in pmi_graph().run(&inputs)? {
        println!("{}", row?);
    }
    Ok(())
}
