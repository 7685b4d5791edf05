use candle_core::{DType, Device, Tensor};
use recall_embed::masked_mean;

#[test]
fn masked_mean_ignores_padding() {
    let dev = Device::Cpu;
    // Two tokens with hidden dim 4; second token is masked out.
    let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0,  // token 0
                                 5.0, 6.0, 7.0, 8.0],    // token 1
                               (1, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1i64, 0i64], (1, 2), &dev).unwrap();
    let out = masked_mean(&h, &mask).unwrap();
    let v: Vec<Vec<f32>> = out.to_vec2().unwrap();
    // Mean over unmasked tokens is the first token; no normalization here.
    for (a, b) in v[0].iter().cloned().zip([1.0f32, 2.0, 3.0, 4.0]) {
        assert!((a - b).abs() < 1e-5, "a={} b={}", a, b);
    }
}

#[test]
fn masked_mean_averages_live_tokens() {
    let dev = Device::Cpu;
    let h = Tensor::from_slice(&[1.0f32, 3.0, 5.0, 7.0], (1, 2, 2), &dev).unwrap();
    let mask = Tensor::from_slice(&[1.0f32, 1.0], (1, 2), &dev).unwrap().to_dtype(DType::F32).unwrap();
    let v: Vec<Vec<f32>> = masked_mean(&h, &mask).unwrap().to_vec2().unwrap();
    assert_eq!(v[0], vec![3.0, 5.0]);
}
