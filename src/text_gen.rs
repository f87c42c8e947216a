use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::from_str;

static TEXT_DIR: Dir = include_dir!("src/text");

/// Chance that a word is replaced by a numeral when numbers are enabled.
const NUMBER_RATE: f64 = 0.12;
/// Chance that a word gains trailing punctuation when enabled.
const PUNCT_RATE: f64 = 0.22;
const PUNCT_MARKS: [char; 5] = [',', '.', ';', '!', '?'];

/// Flavor of target text a session types against.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TextMode {
    Words,
    Quotes,
    Code,
    Custom,
}

/// What a mode asks the generator for. Custom text is validated (non-empty)
/// by the caller before a session ever starts.
#[derive(Debug, Clone)]
pub struct GenRequest {
    pub mode: TextMode,
    pub duration_secs: u64,
    pub punctuation: bool,
    pub numbers: bool,
    pub custom: String,
}

#[derive(Deserialize, Clone, Debug)]
struct WordBank {
    #[allow(dead_code)]
    name: String,
    words: Vec<String>,
    #[serde(default)]
    advanced: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
struct PassageBank {
    #[allow(dead_code)]
    name: String,
    passages: Vec<String>,
}

fn load_word_bank(file_name: &str) -> WordBank {
    let file = TEXT_DIR.get_file(file_name).expect("text bank not found");
    let contents = file
        .contents_utf8()
        .expect("unable to interpret text bank as a string");
    from_str(contents).expect("unable to deserialize text bank json")
}

fn load_passage_bank(file_name: &str) -> PassageBank {
    let file = TEXT_DIR.get_file(file_name).expect("text bank not found");
    let contents = file
        .contents_utf8()
        .expect("unable to interpret text bank as a string");
    from_str(contents).expect("unable to deserialize text bank json")
}

/// Produce the word sequence for a session.
///
/// Custom text splits on whitespace; quotes and code pick one fixed passage
/// at random; everything else draws `max(50, duration * 3)` words from the
/// base vocabulary with optional numeral and punctuation sprinkling.
pub fn generate(req: &GenRequest) -> Vec<String> {
    let rng = &mut rand::thread_rng();

    if req.mode == TextMode::Custom && !req.custom.trim().is_empty() {
        return req
            .custom
            .split_whitespace()
            .map(str::to_string)
            .collect();
    }
    if req.mode == TextMode::Quotes {
        let bank = load_passage_bank("quotes.json");
        let passage = bank.passages.choose(rng).expect("empty passage bank");
        return passage.split(' ').map(str::to_string).collect();
    }
    if req.mode == TextMode::Code {
        let bank = load_passage_bank("code.json");
        let passage = bank.passages.choose(rng).expect("empty passage bank");
        return passage.split(' ').map(str::to_string).collect();
    }

    let bank = load_word_bank("words.json");
    let vocab: Vec<&String> = bank.words.iter().chain(bank.advanced.iter()).collect();
    let count = (req.duration_secs as usize * 3).max(50);

    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let mut word = (*vocab.choose(rng).expect("empty word bank")).clone();
        if req.numbers && rng.gen_bool(NUMBER_RATE) {
            word = rng.gen_range(1..=999u32).to_string();
        }
        if req.punctuation && rng.gen_bool(PUNCT_RATE) {
            word.push(*PUNCT_MARKS.choose(rng).expect("punctuation marks"));
        }
        out.push(word);
    }
    out
}

/// Short lowercase words for word rush: a shuffled fixed pool repeated
/// cyclically until `count` is reached.
pub fn rush_words(count: usize) -> Vec<String> {
    let bank = load_word_bank("rush.json");
    let mut pool = bank.words;
    pool.shuffle(&mut rand::thread_rng());

    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        for word in &pool {
            if out.len() >= count {
                break;
            }
            out.push(word.clone());
        }
    }
    out
}
