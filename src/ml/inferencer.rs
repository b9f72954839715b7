// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Extractive Q&A with a pretrained DistilBERT SQuAD checkpoint.
//
// Long contexts do not fit in one forward pass, so the context
// tokens are cut into overlapping windows:
//
//   [CLS] question [SEP] context[window] [SEP]
//
// For each window the start/end logits are soft-maxed over the
// context tokens (plus [CLS], which is then zeroed), and the
// span maximising p_start * p_end with start <= end and at most
// `max_answer_len` tokens wins. The best span over all windows
// is mapped back to a substring of the original context through
// the tokenizer's byte offsets.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, Recorder},
};
use burn_import::safetensors::{AdapterType, LoadArgs, SafetensorsFileRecorder};
use std::ops::Range;
use tokenizers::Tokenizer;

use crate::domain::{error::QaError, qa_result::QaResult, traits::QuestionAnswerer};
use crate::infra::model_store::{ModelStore, DEFAULT_MODEL_ID, DEFAULT_REVISION};
use crate::ml::model::{DistilBertConfig, DistilBertQa, HF_KEY_REMAP};

type InferBackend = burn::backend::NdArray;

// Questions longer than this are truncated before windowing
const MAX_QUESTION_LEN: usize = 64;

/// Knobs for model selection and span decoding.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub model_id:       String,
    pub revision:       String,
    pub max_seq_len:    usize,
    pub doc_stride:     usize,
    pub max_answer_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_id:       DEFAULT_MODEL_ID.to_string(),
            revision:       DEFAULT_REVISION.to_string(),
            max_seq_len:    384,
            doc_stride:     128,
            max_answer_len: 15,
        }
    }
}

pub struct Inferencer {
    model:     DistilBertQa<InferBackend>,
    tokenizer: Tokenizer,
    config:    EngineConfig,
    cls_id:    u32,
    sep_id:    u32,
    device:    burn::backend::ndarray::NdArrayDevice,
}

impl Inferencer {
    /// Fetch the checkpoint and import its weights.
    /// Any failure is reported as QaError::ModelLoad.
    pub fn load(config: EngineConfig) -> Result<Self> {
        let store  = ModelStore::new(&config.model_id, &config.revision);
        let files  = store.fetch()?;
        let tokenizer = store.load_tokenizer(&files.tokenizer)?;

        let special = |token: &str| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| QaError::model_load(&config.model_id, format!("tokenizer has no {token}")))
        };
        let cls_id = special("[CLS]")?;
        let sep_id = special("[SEP]")?;

        let model_cfg = DistilBertConfig::from_file(&files.config)
            .map_err(|e| QaError::model_load(&config.model_id, format!("{e:#}")))?;
        if config.max_seq_len > model_cfg.max_position_embeddings {
            return Err(QaError::model_load(
                &config.model_id,
                format!(
                    "max_seq_len {} exceeds the model's {} positions",
                    config.max_seq_len, model_cfg.max_position_embeddings
                ),
            )
            .into());
        }

        let device = burn::backend::ndarray::NdArrayDevice::default();
        let model: DistilBertQa<InferBackend> = model_cfg.init(&device);

        let args = HF_KEY_REMAP
            .iter()
            .fold(LoadArgs::new(files.weights.clone()), |args, (pattern, replacement)| {
                args.with_key_remap(pattern, replacement)
            })
            .with_adapter_type(AdapterType::PyTorch);
        let record = SafetensorsFileRecorder::<FullPrecisionSettings>::default()
            .load(args, &device)
            .map_err(|e| QaError::model_load(&config.model_id, format!("{e:?}")))?;
        let model = model.load_record(record);

        tracing::info!(
            "Loaded '{}' ({} layers, dim {})",
            config.model_id, model_cfg.n_layers, model_cfg.dim
        );
        Ok(Self { model, tokenizer, config, cls_id, sep_id, device })
    }

    pub fn predict(&self, question: &str, context: &str) -> Result<QaResult> {
        if question.trim().is_empty() {
            return Err(QaError::answer("question is empty").into());
        }
        if context.trim().is_empty() {
            return Err(QaError::answer("context is empty").into());
        }

        let q_enc = self.tokenizer.encode(question, false)
            .map_err(|e| QaError::answer(format!("cannot tokenise question: {e}")))?;
        let c_enc = self.tokenizer.encode(context, false)
            .map_err(|e| QaError::answer(format!("cannot tokenise context: {e}")))?;

        let q_ids = &q_enc.get_ids()[..q_enc.len().min(MAX_QUESTION_LEN)];
        let c_ids = c_enc.get_ids();
        let c_offsets = c_enc.get_offsets();
        if c_ids.is_empty() {
            return Err(QaError::answer("context produced no tokens").into());
        }

        let window_len = self.config.max_seq_len.saturating_sub(q_ids.len() + 3);
        if window_len == 0 {
            return Err(QaError::answer("question leaves no room for context").into());
        }

        let mut outputs = Vec::new();
        for window in context_windows(c_ids.len(), window_len, self.config.doc_stride) {
            let mut input_ids: Vec<u32> = Vec::with_capacity(q_ids.len() + window.len() + 3);
            input_ids.push(self.cls_id);
            input_ids.extend_from_slice(q_ids);
            input_ids.push(self.sep_id);
            let context_start = input_ids.len();
            input_ids.extend_from_slice(&c_ids[window.clone()]);
            input_ids.push(self.sep_id);

            let (start_logits, end_logits) = self.logits(&input_ids)?;
            outputs.push(WindowLogits { window, context_start, start_logits, end_logits });
        }

        best_answer(context, c_offsets, &outputs, self.config.max_answer_len)
    }

    /// One forward pass over a single sequence
    fn logits(&self, input_ids: &[u32]) -> Result<(Vec<f32>, Vec<f32>)> {
        let seq_len = input_ids.len();
        let ids: Vec<i64> = input_ids.iter().map(|&x| x as i64).collect();
        let input = Tensor::<InferBackend, 2, Int>::from_data(
            TensorData::new(ids, [1, seq_len]),
            &self.device,
        );

        let output = self.model.forward(input);
        let to_vec = |t: Tensor<InferBackend, 2>| -> Result<Vec<f32>> {
            t.reshape([seq_len])
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| QaError::answer(format!("cannot read logits: {e:?}")))
                .context("Model output")
        };
        Ok((to_vec(output.start_logits)?, to_vec(output.end_logits)?))
    }
}

impl QuestionAnswerer for Inferencer {
    fn answer(&self, question: &str, context: &str) -> Result<QaResult> {
        self.predict(question, context)
    }
}

/// Model output for one `[CLS] question [SEP] context[window] [SEP]` sequence.
#[derive(Debug, Clone)]
struct WindowLogits {
    /// Context tokens covered, as indices into the whole context encoding
    window:        Range<usize>,
    /// Sequence position of the window's first context token
    context_start: usize,
    start_logits:  Vec<f32>,
    end_logits:    Vec<f32>,
}

/// Best span inside one window, mapped back to a substring of `context`.
/// `offsets` are the byte offsets of every context token.
fn decode_window(
    context:        &str,
    offsets:        &[(usize, usize)],
    output:         &WindowLogits,
    max_answer_len: usize,
) -> Result<Option<QaResult>> {
    let WindowLogits { window, context_start, start_logits, end_logits } = output;
    let context_tokens = *context_start..context_start + window.len();
    let Some((s, e, score)) = best_span(start_logits, end_logits, context_tokens, max_answer_len) else {
        return Ok(None);
    };

    let first = window.start + (s - context_start);
    let last  = window.start + (e - context_start);
    let (Some(&(begin, _)), Some(&(_, end))) = (offsets.get(first), offsets.get(last)) else {
        return Err(QaError::answer(format!(
            "answer tokens {first}..={last} exceed {} context offsets", offsets.len()
        )).into());
    };
    let span = begin..end;
    let answer = context
        .get(span.clone())
        .ok_or_else(|| QaError::answer(format!("answer span {span:?} is not on a character boundary")))?;

    tracing::debug!("Window {:?} span [{},{}] conf={:.4} answer='{}'", window, s, e, score, answer);
    Ok(Some(QaResult::new(answer, score).with_span(span)))
}

/// Highest-scoring span over all windows; earlier windows win ties.
fn best_answer(
    context:        &str,
    offsets:        &[(usize, usize)],
    outputs:        &[WindowLogits],
    max_answer_len: usize,
) -> Result<QaResult> {
    let mut best: Option<QaResult> = None;
    for output in outputs {
        if let Some(result) = decode_window(context, offsets, output, max_answer_len)? {
            if best.as_ref().map_or(true, |b| result.score > b.score) {
                best = Some(result);
            }
        }
    }
    best.ok_or_else(|| QaError::answer("no answer span found").into())
}

/// Overlapping token windows covering `0..total`. Consecutive
/// windows share `overlap` tokens.
fn context_windows(total: usize, window_len: usize, overlap: usize) -> Vec<Range<usize>> {
    let step = window_len.saturating_sub(overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + window_len).min(total);
        windows.push(start..end);
        if end >= total {
            break;
        }
        start += step;
    }
    windows
}

/// Softmax over `allowed` positions plus [CLS] at index 0; every other
/// position gets probability zero.
fn masked_softmax(logits: &[f32], allowed: &Range<usize>) -> Vec<f32> {
    let keep = |i: usize| i == 0 || allowed.contains(&i);
    let max = logits
        .iter()
        .enumerate()
        .filter(|(i, _)| keep(*i))
        .map(|(_, &l)| l)
        .fold(f32::NEG_INFINITY, f32::max);

    let exps: Vec<f32> = logits
        .iter()
        .enumerate()
        .map(|(i, &l)| if keep(i) { (l - max).exp() } else { 0.0 })
        .collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Best (start, end, score) with both ends inside `context` and
/// `end - start < max_answer_len`.
fn best_span(
    start_logits:   &[f32],
    end_logits:     &[f32],
    context:        Range<usize>,
    max_answer_len: usize,
) -> Option<(usize, usize, f32)> {
    if context.is_empty() || max_answer_len == 0 {
        return None;
    }
    let start_probs = masked_softmax(start_logits, &context);
    let end_probs   = masked_softmax(end_logits, &context);

    let mut best: Option<(usize, usize, f32)> = None;
    for s in context.clone() {
        for e in s..(s + max_answer_len).min(context.end) {
            let score = start_probs[s] * end_probs[e];
            if best.map_or(true, |(_, _, b)| score > b) {
                best = Some((s, e, score));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_window_when_context_fits() {
        assert_eq!(context_windows(10, 20, 5), vec![0..10]);
    }

    #[test]
    fn test_windows_overlap_and_cover_everything() {
        let w = context_windows(25, 10, 4);
        assert_eq!(w, vec![0..10, 6..16, 12..22, 18..25]);
    }

    #[test]
    fn test_overlap_not_smaller_than_window_still_advances() {
        let w = context_windows(5, 2, 8);
        assert_eq!(w.first(), Some(&(0..2)));
        assert_eq!(w.last(), Some(&(3..5)));
    }

    #[test]
    fn test_masked_softmax_ignores_question_tokens() {
        // [CLS] q q [SEP] c c [SEP]
        let logits = [0.0, 9.0, 9.0, 9.0, 1.0, 1.0, 9.0];
        let p = masked_softmax(&logits, &(4..6));
        assert_eq!(p[1], 0.0);
        assert_eq!(p[3], 0.0);
        assert_eq!(p[6], 0.0);
        let total: f32 = p.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_best_span_picks_highest_product() {
        // [CLS] q [SEP] c0 c1 c2 [SEP]
        let start = [5.0, 9.0, 9.0, 0.0, 4.0, 0.0, 9.0];
        let end   = [5.0, 9.0, 9.0, 0.0, 0.0, 4.0, 9.0];
        let (s, e, score) = best_span(&start, &end, 3..6, 15).unwrap();
        assert_eq!((s, e), (4, 5));
        assert!(score > 0.0 && score <= 1.0);
    }

    #[test]
    fn test_best_span_respects_max_answer_len() {
        let start = [0.0, 8.0, 0.0, 0.0, 0.0];
        let end   = [0.0, 0.0, 0.0, 0.0, 8.0];
        let (s, e, _) = best_span(&start, &end, 1..5, 2).unwrap();
        assert!(e - s < 2);
    }

    #[test]
    fn test_best_span_never_starts_after_end() {
        let start = [0.0, 0.0, 0.0, 9.0];
        let end   = [0.0, 9.0, 0.0, 0.0];
        let (s, e, _) = best_span(&start, &end, 1..4, 15).unwrap();
        assert!(s <= e);
    }

    const CAFE: &str = "Le café coûte trois euros. La crème brûlée vient de Zürich.";

    /// Byte offsets of single-space separated words, like a tokenizer
    /// would report them.
    fn word_offsets(text: &str) -> Vec<(usize, usize)> {
        let mut pos = 0;
        text.split(' ')
            .map(|w| {
                let span = (pos, pos + w.len());
                pos += w.len() + 1;
                span
            })
            .collect()
    }

    /// Flat logits for `[CLS] q q [SEP] context[window] [SEP]`, with an
    /// optional peak on context tokens `s..=e` (whole-context indices).
    fn window_logits(window: Range<usize>, peak: Option<(usize, usize, f32)>) -> WindowLogits {
        let context_start = 4;
        let len = context_start + window.len() + 1;
        let mut start_logits = vec![0.0; len];
        let mut end_logits   = vec![0.0; len];
        if let Some((s, e, height)) = peak {
            start_logits[context_start + s - window.start] = height;
            end_logits[context_start + e - window.start]   = height;
        }
        WindowLogits { window, context_start, start_logits, end_logits }
    }

    #[test]
    fn test_decode_window_maps_multibyte_span() {
        let offsets = word_offsets(CAFE);
        let result = decode_window(CAFE, &offsets, &window_logits(0..6, Some((1, 1, 8.0))), 15)
            .unwrap()
            .unwrap();

        assert_eq!(result.answer, "café");
        assert_eq!(result.span, 3..8);
        assert_eq!(&CAFE[result.span.clone()], result.answer);
    }

    #[test]
    fn test_decode_window_offsets_by_window_start() {
        // Window 4..10 covers "euros." .. "de"; local token 2 is "crème".
        let offsets = word_offsets(CAFE);
        let result = decode_window(CAFE, &offsets, &window_logits(4..10, Some((6, 7, 8.0))), 15)
            .unwrap()
            .unwrap();

        assert_eq!(result.answer, "crème brûlée");
        assert_eq!(&CAFE[result.span.clone()], "crème brûlée");
    }

    #[test]
    fn test_best_answer_comes_from_second_window() {
        let offsets = word_offsets(CAFE);
        let windows = context_windows(offsets.len(), 6, 2);
        assert_eq!(windows, vec![0..6, 4..10, 8..11]);

        let outputs = vec![
            window_logits(windows[0].clone(), Some((1, 1, 4.0))),
            window_logits(windows[1].clone(), Some((6, 7, 10.0))),
            window_logits(windows[2].clone(), None),
        ];
        let result = best_answer(CAFE, &offsets, &outputs, 15).unwrap();

        assert_eq!(result.answer, "crème brûlée");
        assert_eq!(&CAFE[result.span.clone()], result.answer);
        let first = decode_window(CAFE, &offsets, &outputs[0], 15).unwrap().unwrap();
        assert!(result.score > first.score);
    }

    #[test]
    fn test_span_inside_a_character_is_an_error() {
        // "café" is bytes 0..5; byte 4 falls inside "é".
        let offsets = vec![(0, 4)];
        let err = decode_window("café", &offsets, &window_logits(0..1, None), 15).unwrap_err();
        assert!(err.to_string().contains("character boundary"));
    }

    #[test]
    fn test_best_answer_without_spans_fails() {
        let offsets = word_offsets(CAFE);
        let outputs = vec![window_logits(0..6, Some((1, 1, 4.0)))];
        assert!(best_answer(CAFE, &offsets, &outputs, 0).is_err());
    }

    #[test]
    fn test_default_engine_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.model_id, "distilbert-base-uncased-distilled-squad");
        assert_eq!((cfg.max_seq_len, cfg.doc_stride, cfg.max_answer_len), (384, 128, 15));
    }
}
